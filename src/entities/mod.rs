pub mod prelude;

pub mod activity_log;
pub mod admins;
pub mod audit_log;
pub mod election_settings;
pub mod parties;
pub mod system_config;
pub mod voters;
pub mod votes;
