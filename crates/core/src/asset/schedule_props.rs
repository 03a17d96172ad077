//! Property-based tests for board generation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::schedule::ScheduleGenerator;
use super::types::{Asset, AssetParams, DepreciationMethod, ScheduleContext};
use crate::calendar::{MethodPeriod, ProrataConvention, end_of_month};
use crate::fiscal::LockDates;
use deprecia_shared::types::Currency;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2015i32..2030, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        let first = NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        let last = end_of_month(first);
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(last)
    })
}

fn period_strategy() -> impl Strategy<Value = MethodPeriod> {
    prop_oneof![Just(MethodPeriod::Monthly), Just(MethodPeriod::Yearly)]
}

fn prorata_strategy() -> impl Strategy<Value = ProrataConvention> {
    prop_oneof![
        Just(ProrataConvention::None),
        Just(ProrataConvention::ConstantPeriods)
    ]
}

/// Parameters with salvage up to half the value and an import up to half
/// of what remains.
fn params_strategy() -> impl Strategy<Value = AssetParams> {
    (
        date_strategy(),
        100i64..100_000_000,
        0i64..=50,
        0i64..=50,
        1u32..=60,
        period_strategy(),
        prorata_strategy(),
    )
        .prop_map(|(acquisition_date, cents, salvage, import, method_number, period, prorata)| {
            let currency = Currency::default();
            let original_value = Decimal::new(cents, 2);
            let salvage_value = percent_of(currency, original_value, salvage);
            let import = percent_of(currency, original_value - salvage_value, import);
            AssetParams {
                name: "Generated".into(),
                currency,
                acquisition_date,
                original_value,
                salvage_value,
                method: DepreciationMethod::Linear,
                method_number,
                method_period: period,
                prorata_computation_type: prorata,
                already_depreciated_amount_import: import,
            }
        })
}

fn percent_of(currency: Currency, amount: Decimal, pct: i64) -> Decimal {
    currency.round(amount * Decimal::from(pct) / Decimal::ONE_HUNDRED)
}

fn validated(params: AssetParams, ctx: &ScheduleContext) -> Asset {
    let mut asset = Asset::new(params);
    ScheduleGenerator::validate(&mut asset, ctx).unwrap();
    asset
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Remaining plus depreciated always equals the depreciable value.
    #[test]
    fn prop_cumulative_values_balance(params in params_strategy(), as_of in date_strategy()) {
        let asset = validated(params, &ScheduleContext::new(as_of));
        let total = asset.total_depreciable();
        for mv in &asset.moves {
            prop_assert_eq!(mv.asset_remaining_value + mv.asset_depreciated_value, total);
        }
    }

    /// The board expenses exactly the depreciable base and ends at zero.
    #[test]
    fn prop_board_closes_at_zero(params in params_strategy()) {
        let asset = validated(params, &ScheduleContext::new(NaiveDate::MIN));
        let expensed: Decimal = asset.moves.iter().map(|m| m.depreciation_value).sum();
        prop_assert_eq!(expensed, asset.depreciable_base());
        if let Some(last) = asset.moves.last() {
            prop_assert_eq!(last.asset_remaining_value, Decimal::ZERO);
        } else {
            prop_assert!(asset.depreciable_base().is_zero());
        }
    }

    /// Amounts are non-negative, dates never go backwards and no move falls
    /// after the final date.
    #[test]
    fn prop_board_is_monotone(params in params_strategy()) {
        let asset = validated(params, &ScheduleContext::new(NaiveDate::MIN));
        let final_date = asset.final_date();
        prop_assert!(asset.moves.len() <= asset.params.method_number as usize + 1);
        for pair in asset.moves.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
            prop_assert!(pair[0].asset_remaining_value >= pair[1].asset_remaining_value);
        }
        for mv in &asset.moves {
            prop_assert!(mv.depreciation_value >= Decimal::ZERO);
            prop_assert!(mv.date <= final_date);
        }
    }

    /// No generated move is dated inside the locked range.
    #[test]
    fn prop_no_move_inside_lock(params in params_strategy(), lock in date_strategy()) {
        let ctx = ScheduleContext::new(NaiveDate::MIN)
            .with_lock_dates(LockDates::period(lock));
        let asset = validated(params, &ctx);
        for mv in &asset.moves {
            prop_assert!(mv.date > lock);
        }
    }
}
