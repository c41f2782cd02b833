//! Login-attempt throttling with lockout.
//!
//! The decision is computed from the voter's persisted counters and the
//! supplied-secret check; the caller persists the transition that
//! [`LoginOutcome::transition`] reports. An active lock short-circuits before
//! the secret is ever consulted, so a correct password during a lockout still
//! returns `Locked`.

use chrono::{DateTime, Duration, Utc};

/// Throttle parameters, read from the system_config cache by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub max_attempts: u32,
    pub lock_minutes: i64,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Secret matched; counters reset and a session may be established.
    Success,

    /// Locked out, either from a pre-existing lock or because this attempt
    /// exhausted the allowance.
    Locked {
        remaining_minutes: i64,
        unlock_at: DateTime<Utc>,
        newly_locked: bool,
    },

    /// Secret mismatched but attempts remain; `attempts` is the counter value
    /// after this failure as seen by this evaluation.
    Rejected { attempts: u32 },
}

/// The persisted-state change implied by an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Set `login_attempts = 0`, clear `locked_until`.
    Reset,

    /// Atomically increment `login_attempts` in place. Concurrent failures
    /// must each count, so the store adds one rather than writing the value
    /// this evaluation computed from a possibly stale read.
    IncrementAttempts,

    /// Set `locked_until`, reset `login_attempts` to 0.
    Lock(DateTime<Utc>),

    /// Pre-existing lock; nothing to write.
    None,
}

impl LoginOutcome {
    #[must_use]
    pub const fn transition(&self) -> Transition {
        match self {
            Self::Success => Transition::Reset,
            Self::Rejected { .. } => Transition::IncrementAttempts,
            Self::Locked {
                newly_locked: true,
                unlock_at,
                ..
            } => Transition::Lock(*unlock_at),
            Self::Locked { .. } => Transition::None,
        }
    }
}

/// Evaluates one login attempt.
///
/// `secret_ok` is the result of the hash verification; it is ignored while a
/// lock is active.
#[must_use]
pub fn evaluate(
    now: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
    login_attempts: u32,
    secret_ok: bool,
    policy: ThrottlePolicy,
) -> LoginOutcome {
    if let Some(unlock_at) = locked_until
        && unlock_at > now
    {
        return LoginOutcome::Locked {
            remaining_minutes: remaining_minutes(now, unlock_at),
            unlock_at,
            newly_locked: false,
        };
    }

    if secret_ok {
        return LoginOutcome::Success;
    }

    let attempts = login_attempts + 1;
    if attempts >= policy.max_attempts {
        let unlock_at = now + Duration::minutes(policy.lock_minutes);
        return LoginOutcome::Locked {
            remaining_minutes: policy.lock_minutes,
            unlock_at,
            newly_locked: true,
        };
    }

    LoginOutcome::Rejected { attempts }
}

/// Minutes until `unlock_at`, rounded up.
fn remaining_minutes(now: DateTime<Utc>, unlock_at: DateTime<Utc>) -> i64 {
    let secs = (unlock_at - now).num_seconds().max(0);
    (secs + 59) / 60
}
