//! Prorata day counts and period boundaries.

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use deprecia_shared::types::Currency;

/// Days in a month under the constant-period convention.
pub const DAYS_PER_MONTH: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Days in a year under the constant-period convention.
pub const DAYS_PER_YEAR: Decimal = Decimal::from_parts(360, 0, 0, false, 0);

/// Length of one depreciation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodPeriod {
    /// One month per period.
    Monthly,
    /// Twelve months per period, ending on 31 December.
    Yearly,
}

impl MethodPeriod {
    /// Number of months in one period.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Yearly => 12,
        }
    }
}

/// How the first period of an asset is prorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrataConvention {
    /// Depreciation starts at the beginning of the acquisition period.
    None,
    /// Depreciation starts on the acquisition date, counted in 30-day months.
    #[default]
    ConstantPeriods,
}

/// Number of days in the month containing `date`.
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    end_of_month(date).day()
}

/// Last day of the month containing `date`.
#[must_use]
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    previous_day(first + Months::new(1))
}

/// First day of the period containing `date`.
#[must_use]
pub fn start_of_period(date: NaiveDate, period: MethodPeriod) -> NaiveDate {
    let month = match period {
        MethodPeriod::Monthly => date.month(),
        MethodPeriod::Yearly => 1,
    };
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// Last day of the period containing `date`.
#[must_use]
pub fn end_of_period(date: NaiveDate, period: MethodPeriod) -> NaiveDate {
    match period {
        MethodPeriod::Monthly => end_of_month(date),
        MethodPeriod::Yearly => NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
    }
}

/// Adds calendar months, clamping to the end of shorter months.
///
/// Saturates at the last representable date.
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX)
}

/// The day after `date`.
#[must_use]
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date + Days::new(1)
}

/// The day before `date`.
#[must_use]
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date - Days::new(1)
}

/// Counts the days from `start` to `end`, both included, in 30-day months.
///
/// The first and last months are prorated on their actual length and then
/// scaled to 30 days, so one day of June counts 1 while the last day of
/// February counts 30/28. Whole months in between count 30 each.
///
/// Returns zero when `end` is before `start`.
#[must_use]
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Decimal {
    if end < start {
        return Decimal::ZERO;
    }

    let start_month_days = Decimal::from(days_in_month(start));
    let end_month_days = Decimal::from(days_in_month(end));

    let start_prorata =
        Decimal::from(days_in_month(start) - start.day() + 1) * DAYS_PER_MONTH / start_month_days;
    let end_prorata = Decimal::from(end.day()) * DAYS_PER_MONTH / end_month_days;
    let years = Decimal::from(end.year() - start.year()) * DAYS_PER_YEAR;
    let months = (Decimal::from(end.month()) - Decimal::from(start.month()) - Decimal::ONE)
        * DAYS_PER_MONTH;

    (start_prorata + end_prorata + years + months).max(Decimal::ZERO)
}

/// Fraction of the period `[period_start, period_end]` elapsed on `event_date`.
///
/// The event day itself counts as elapsed. The result is clamped to `[0, 1]`.
#[must_use]
pub fn partial_period_fraction(
    period_start: NaiveDate,
    period_end: NaiveDate,
    event_date: NaiveDate,
) -> Decimal {
    let total = days_between(period_start, period_end);
    if total.is_zero() || event_date < period_start {
        return Decimal::ZERO;
    }
    if event_date >= period_end {
        return Decimal::ONE;
    }
    (days_between(period_start, event_date) / total).min(Decimal::ONE)
}

/// Share of `amount` falling in `[period_start, event_date]`, rounded to the
/// currency.
///
/// Multiplies before dividing so that one day of a 600 month gives exactly 20.
#[must_use]
pub fn prorate(
    amount: Decimal,
    currency: Currency,
    period_start: NaiveDate,
    period_end: NaiveDate,
    event_date: NaiveDate,
) -> Decimal {
    let total = days_between(period_start, period_end);
    if total.is_zero() || event_date < period_start {
        return Decimal::ZERO;
    }
    if event_date >= period_end {
        return currency.round(amount);
    }
    currency.round(amount * days_between(period_start, event_date) / total)
}

/// Number of periods touched by the range `[start, end]`.
#[must_use]
pub fn periods_between(start: NaiveDate, end: NaiveDate, period: MethodPeriod) -> u32 {
    if end < start {
        return 0;
    }
    let years = i64::from(end.year() - start.year());
    let count = match period {
        MethodPeriod::Monthly => {
            years * 12 + i64::from(end.month0()) - i64::from(start.month0()) + 1
        }
        MethodPeriod::Yearly => years + 1,
    };
    u32::try_from(count).unwrap_or(0)
}
