//! Domain services: thin policy-enforcing layers between the web handlers
//! and the store. Every mutating operation authorizes first, mutates second,
//! and audit-logs last (fire-and-forget).

pub mod admins;
pub mod audit;
pub mod auth;
pub mod election;
pub mod parties;
pub mod registration;
pub mod system_config;
pub mod votes;

pub use admins::{AdminError, AdminService};
pub use audit::{AuditError, AuditSink, RequestMeta};
pub use auth::{AuthError, AuthService, VoterLogin};
pub use election::{ElectionError, ElectionService};
pub use parties::{PartyError, PartyService};
pub use registration::{RegistrationError, RegistrationService};
pub use system_config::SystemConfigCache;
pub use votes::{CastOutcome, VoteError, VoteService};
