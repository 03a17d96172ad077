//! Property-based tests for the 30-day-month calendar.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use deprecia_shared::types::Currency;

use super::prorata::{
    DAYS_PER_MONTH, days_between, end_of_month, next_day, partial_period_fraction, prorate,
};

/// Strategy for a date between 2000 and 2040.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        let first = NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        let last = end_of_month(first);
        NaiveDate::from_ymd_opt(y, m, d.min(last.day0() + 1)).unwrap()
    })
}

/// Strategy for an ordered triple `a <= b < c`.
fn ordered_triple() -> impl Strategy<Value = (NaiveDate, NaiveDate, NaiveDate)> {
    (date_strategy(), 0u64..2000, 1u64..2000).prop_map(|(a, gap1, gap2)| {
        let b = a + chrono::Days::new(gap1);
        let c = b + chrono::Days::new(gap2);
        (a, b, c)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Splitting a range at any day gives back the same total.
    #[test]
    fn prop_days_between_is_additive((a, b, c) in ordered_triple()) {
        let whole = days_between(a, c);
        let split = days_between(a, b) + days_between(next_day(b), c);
        prop_assert_eq!(whole.round_dp(10), split.round_dp(10));
    }

    /// A full calendar month always counts 30 days.
    #[test]
    fn prop_full_month_is_thirty_days(date in date_strategy()) {
        let first = date.with_day(1).unwrap();
        prop_assert_eq!(days_between(first, end_of_month(first)), DAYS_PER_MONTH);
    }

    /// Day counts are never negative.
    #[test]
    fn prop_days_between_non_negative(a in date_strategy(), b in date_strategy()) {
        prop_assert!(days_between(a, b) >= Decimal::ZERO);
    }

    /// Fractions stay within the unit interval.
    #[test]
    fn prop_fraction_within_unit_interval(
        (start, event, end) in ordered_triple(),
    ) {
        let fraction = partial_period_fraction(start, end, event);
        prop_assert!(fraction >= Decimal::ZERO);
        prop_assert!(fraction <= Decimal::ONE);
    }

    /// A prorated share is a rounded amount between zero and the whole.
    #[test]
    fn prop_prorate_within_amount(
        (start, event, end) in ordered_triple(),
        cents in 0i64..100_000_000,
    ) {
        let amount = Decimal::new(cents, 2);
        let share = prorate(amount, Currency::Usd, start, end, event);
        prop_assert!(share >= Decimal::ZERO);
        prop_assert!(share <= amount);
        prop_assert_eq!(share, share.round_dp(2));
    }
}
