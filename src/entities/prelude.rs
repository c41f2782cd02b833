pub use super::activity_log::Entity as ActivityLog;
pub use super::admins::Entity as Admins;
pub use super::audit_log::Entity as AuditLog;
pub use super::election_settings::Entity as ElectionSettings;
pub use super::parties::Entity as Parties;
pub use super::system_config::Entity as SystemConfig;
pub use super::voters::Entity as Voters;
pub use super::votes::Entity as Votes;
