//! Time-window policy engine.
//!
//! Two kinds of windows exist: the election (voting) window, which is open
//! only while both dates are set and `now` falls between them, and the
//! registration window, where an explicit admin flag and the date window are
//! independent, either-sufficient conditions. Boundaries are inclusive on
//! both ends.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("start date must be before end date")]
    InvertedRange,
}

/// True iff both dates are set and `start <= now <= end`.
///
/// There is no override flag for elections; missing dates mean closed.
#[must_use]
pub fn election_open(
    now: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => start <= now && now <= end,
        _ => false,
    }
}

/// True iff the explicit flag is set OR the date window contains `now`.
///
/// The flag lets admins force registration open irrespective of any scheduled
/// window. Mutual exclusion with a live election is enforced by the caller,
/// not here.
#[must_use]
pub fn registration_open(
    now: DateTime<Utc>,
    explicit_flag: bool,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    explicit_flag || election_open(now, start, end)
}

/// Validates an admin-supplied window before it is persisted.
///
/// `start == end` and `start > end` are both rejected.
pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), WindowError> {
    if start >= end {
        return Err(WindowError::InvertedRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_election_open_inside_window() {
        assert!(election_open(at(12), Some(at(10)), Some(at(14))));
    }

    #[test]
    fn test_election_boundaries_are_inclusive() {
        assert!(election_open(at(10), Some(at(10)), Some(at(14))));
        assert!(election_open(at(14), Some(at(10)), Some(at(14))));
    }

    #[test]
    fn test_election_closed_outside_window() {
        assert!(!election_open(at(9), Some(at(10)), Some(at(14))));
        assert!(!election_open(at(15), Some(at(10)), Some(at(14))));
    }

    #[test]
    fn test_election_closed_when_any_date_missing() {
        assert!(!election_open(at(12), None, Some(at(14))));
        assert!(!election_open(at(12), Some(at(10)), None));
        assert!(!election_open(at(12), None, None));
    }

    #[test]
    fn test_registration_flag_alone_is_sufficient() {
        assert!(registration_open(at(12), true, None, None));
        assert!(registration_open(at(20), true, Some(at(10)), Some(at(14))));
    }

    #[test]
    fn test_registration_window_alone_is_sufficient() {
        assert!(registration_open(at(12), false, Some(at(10)), Some(at(14))));
    }

    #[test]
    fn test_registration_closed_without_flag_or_window() {
        assert!(!registration_open(at(12), false, None, None));
        assert!(!registration_open(at(20), false, Some(at(10)), Some(at(14))));
    }

    #[test]
    fn test_validate_window_rejects_equal_and_inverted() {
        assert_eq!(
            validate_window(at(10), at(10)),
            Err(WindowError::InvertedRange)
        );
        assert_eq!(
            validate_window(at(14), at(10)),
            Err(WindowError::InvertedRange)
        );
        assert!(validate_window(at(10), at(14)).is_ok());
    }
}
