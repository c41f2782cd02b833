//! Pure decision logic: time windows, login throttling, role gates and
//! identifier validation. Nothing in here touches the database or the web
//! layer, so all of it is unit-testable with plain values.

pub mod access;
pub mod fin;
pub mod throttle;
pub mod window;

pub use access::{AccessDenied, AccessLevel, AdminIdentity, Capability, Role, authorize};
pub use fin::is_valid_fin;
pub use throttle::{LoginOutcome, ThrottlePolicy};
