//! Calendar arithmetic for depreciation schedules.
//!
//! All day counts use a constant-period convention: every month counts as
//! 30 days and every year as 360 days, whatever the actual month length.

pub mod prorata;

#[cfg(test)]
mod props;

pub use prorata::{
    DAYS_PER_MONTH, DAYS_PER_YEAR, MethodPeriod, ProrataConvention, add_months, days_between,
    days_in_month, end_of_month, end_of_period, next_day, partial_period_fraction,
    periods_between, previous_day, prorate, start_of_period,
};
