//! Lock-date guard for depreciation moves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{end_of_month, next_day};

/// Company lock dates.
///
/// Both dates are optional. The effective lock is the later of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockDates {
    /// Closing date of the last locked fiscal year.
    #[serde(default)]
    pub fiscal_year_lock: Option<NaiveDate>,
    /// Closing date of the last locked period, usually a month end.
    #[serde(default)]
    pub period_lock: Option<NaiveDate>,
}

impl LockDates {
    /// No lock at all.
    #[must_use]
    pub const fn unlocked() -> Self {
        Self {
            fiscal_year_lock: None,
            period_lock: None,
        }
    }

    /// Only a period lock.
    #[must_use]
    pub const fn period(date: NaiveDate) -> Self {
        Self {
            fiscal_year_lock: None,
            period_lock: Some(date),
        }
    }

    /// The later of the two lock dates, if any.
    #[must_use]
    pub fn effective(&self) -> Option<NaiveDate> {
        match (self.fiscal_year_lock, self.period_lock) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Returns true if `date` falls on or before the effective lock.
    #[must_use]
    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.effective().is_some_and(|lock| date <= lock)
    }
}

/// A posted move inside the locked range would have to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Move dated {move_date} is posted inside the locked range ending {lock_date}")]
pub struct LockViolation {
    /// Accounting date of the offending move.
    pub move_date: NaiveDate,
    /// Effective lock date.
    pub lock_date: NaiveDate,
}

/// Moves `date` out of the locked range.
///
/// A date on or before the lock becomes the last day of the month following
/// the lock date. Any other date is returned unchanged.
#[must_use]
pub fn clamp_to_unlocked(date: NaiveDate, lock: Option<NaiveDate>) -> NaiveDate {
    match lock {
        Some(lock) if date <= lock => end_of_month(next_day(lock)),
        _ => date,
    }
}

/// Checks that a move may still be changed or removed.
///
/// Draft moves are always mutable. Posted moves are frozen on or before the lock.
///
/// # Errors
///
/// Returns `LockViolation` for a posted move dated on or before `lock`.
pub fn ensure_mutable(
    move_date: NaiveDate,
    posted: bool,
    lock: Option<NaiveDate>,
) -> Result<(), LockViolation> {
    match lock {
        Some(lock_date) if posted && move_date <= lock_date => Err(LockViolation {
            move_date,
            lock_date,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_effective_lock_is_the_later_date() {
        let locks = LockDates {
            fiscal_year_lock: Some(date(2021, 12, 31)),
            period_lock: Some(date(2022, 3, 31)),
        };
        assert_eq!(locks.effective(), Some(date(2022, 3, 31)));
        assert_eq!(LockDates::unlocked().effective(), None);
        assert_eq!(
            LockDates {
                fiscal_year_lock: Some(date(2021, 12, 31)),
                period_lock: None,
            }
            .effective(),
            Some(date(2021, 12, 31))
        );
    }

    #[rstest]
    #[case(date(2022, 2, 28), Some(date(2022, 3, 1)), date(2022, 3, 31))]
    #[case(date(2022, 3, 1), Some(date(2022, 3, 1)), date(2022, 3, 31))]
    #[case(date(2022, 3, 31), Some(date(2022, 3, 1)), date(2022, 3, 31))]
    #[case(date(2022, 1, 31), Some(date(2022, 3, 31)), date(2022, 4, 30))]
    #[case(date(2022, 4, 30), Some(date(2022, 3, 1)), date(2022, 4, 30))]
    #[case(date(2022, 1, 31), None, date(2022, 1, 31))]
    fn test_clamp_to_unlocked(
        #[case] input: NaiveDate,
        #[case] lock: Option<NaiveDate>,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(clamp_to_unlocked(input, lock), expected);
    }

    #[test]
    fn test_posted_move_inside_lock_is_frozen() {
        let lock = Some(date(2022, 3, 1));
        let err = ensure_mutable(date(2022, 2, 28), true, lock).unwrap_err();
        assert_eq!(err.move_date, date(2022, 2, 28));
        assert_eq!(err.lock_date, date(2022, 3, 1));
    }

    #[test]
    fn test_draft_or_later_moves_stay_mutable() {
        let lock = Some(date(2022, 3, 1));
        assert!(ensure_mutable(date(2022, 2, 28), false, lock).is_ok());
        assert!(ensure_mutable(date(2022, 3, 31), true, lock).is_ok());
        assert!(ensure_mutable(date(2022, 2, 28), true, None).is_ok());
    }
}
