//! Property-based tests for reevaluations.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use deprecia_shared::types::AccountId;

use super::reevaluation::{AdjustmentOutcome, ReevaluationInstruction, Reevaluator};
use super::schedule::ScheduleGenerator;
use super::types::{Asset, AssetParams, MoveKind, ScheduleContext};
use crate::calendar::{MethodPeriod, ProrataConvention};

#[derive(Debug, Clone, Copy)]
enum Request {
    Resplit,
    Revalue(i64),
    Dispose,
}

fn request_strategy() -> impl Strategy<Value = Request> {
    prop_oneof![
        Just(Request::Resplit),
        (0i64..=150).prop_map(Request::Revalue),
        Just(Request::Dispose),
    ]
}

fn period_strategy() -> impl Strategy<Value = (MethodPeriod, u32)> {
    prop_oneof![
        (2u32..=48).prop_map(|n| (MethodPeriod::Monthly, n)),
        (2u32..=10).prop_map(|n| (MethodPeriod::Yearly, n)),
    ]
}

fn prorata_strategy() -> impl Strategy<Value = ProrataConvention> {
    prop_oneof![
        Just(ProrataConvention::None),
        Just(ProrataConvention::ConstantPeriods)
    ]
}

/// An asset plus a cutoff strictly before its final date.
fn scenario_strategy() -> impl Strategy<Value = (Asset, NaiveDate)> {
    (
        2018i32..2026,
        1u32..=12,
        1u32..=28,
        100_000i64..100_000_000,
        period_strategy(),
        prorata_strategy(),
        0u64..10_000,
    )
        .prop_map(|(y, m, d, cents, (period, periods), prorata, offset_seed)| {
            let acquisition = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let mut params = AssetParams::linear_monthly(
                "Generated",
                acquisition,
                Decimal::new(cents, 2),
                periods,
            );
            params.method_period = period;
            params.prorata_computation_type = prorata;
            let asset = Asset::new(params);
            let span = u64::try_from((asset.final_date() - acquisition).num_days()).unwrap();
            let cutoff = acquisition + Days::new(offset_seed % span);
            (asset, cutoff)
        })
}

fn instruction(request: Request, asset: &Asset, cutoff: NaiveDate) -> ReevaluationInstruction {
    match request {
        Request::Resplit => ReevaluationInstruction::resplit(cutoff),
        Request::Revalue(pct) => ReevaluationInstruction::revalue(
            cutoff,
            asset.params.currency.round(
                asset.params.original_value * Decimal::from(pct) / Decimal::ONE_HUNDRED,
            ),
        )
        .with_counterpart(AccountId::new()),
        Request::Dispose => ReevaluationInstruction::dispose(cutoff, AccountId::new()),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Moves on or before the cutoff survive untouched.
    #[test]
    fn prop_kept_moves_unchanged(
        (asset, cutoff) in scenario_strategy(),
        request in request_strategy(),
    ) {
        let ctx = ScheduleContext::new(cutoff);
        let mut asset = asset;
        ScheduleGenerator::validate(&mut asset, &ctx).unwrap();
        let before = asset.clone();

        Reevaluator::reevaluate(&mut asset, &instruction(request, &before, cutoff), &ctx).unwrap();

        let kept_before: Vec<_> = before.moves.iter().filter(|m| m.date <= cutoff).collect();
        let kept_after: Vec<_> = asset
            .moves
            .iter()
            .filter(|m| m.date <= cutoff && m.sequence < before.next_sequence())
            .collect();
        prop_assert_eq!(kept_before, kept_after);
    }

    /// The regenerated board balances and ends at zero.
    #[test]
    fn prop_reevaluated_board_closes(
        (asset, cutoff) in scenario_strategy(),
        request in request_strategy(),
    ) {
        let ctx = ScheduleContext::new(cutoff);
        let mut asset = asset;
        ScheduleGenerator::validate(&mut asset, &ctx).unwrap();
        let instruction = instruction(request, &asset, cutoff);

        let outcome = Reevaluator::reevaluate(&mut asset, &instruction, &ctx).unwrap();

        let total = asset.total_depreciable();
        for mv in &asset.moves {
            prop_assert_eq!(mv.asset_remaining_value + mv.asset_depreciated_value, total);
        }
        prop_assert!(asset.residual().is_zero());
        if let Some(last) = asset.moves.last() {
            prop_assert_eq!(last.asset_remaining_value, Decimal::ZERO);
        }
        for pair in asset.moves.windows(2) {
            prop_assert!(pair[0].sort_key() <= pair[1].sort_key());
        }

        match outcome.adjustment {
            AdjustmentOutcome::Increased { amount, child } => {
                let expensed: Decimal = child.moves.iter().map(|m| m.depreciation_value).sum();
                prop_assert_eq!(expensed, amount);
                prop_assert!(child.moves.iter().all(|m| m.date <= asset.final_date()));
            }
            AdjustmentOutcome::Disposed { .. } => {
                prop_assert!(asset.moves.iter().all(|m| m.date <= cutoff));
                let disposals = asset.moves.iter().filter(|m| m.kind == MoveKind::Disposal);
                prop_assert!(disposals.count() <= 1);
            }
            AdjustmentOutcome::Decreased { amount } => {
                prop_assert!(amount > Decimal::ZERO);
            }
            AdjustmentOutcome::Unchanged => {}
        }
    }
}
