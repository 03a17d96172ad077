//! Depreciation board generation.
//!
//! Linear amounts follow a cumulative curve anchored on the prorata date:
//! each period expenses `base × until / lifetime` less what the curve had
//! already expensed at the end of the previous period. Rounding never
//! accumulates because each period re-anchors on the rounded curve.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use super::error::AssetError;
use super::types::{
    Asset, AssetParams, AssetStatus, DepreciationMove, MoveKind, ScheduleContext,
};
use crate::calendar::{days_between, end_of_period, next_day, previous_day};
use crate::fiscal::clamp_to_unlocked;

/// A value decrease already booked on the board.
#[derive(Debug, Clone, Copy)]
struct Decrease {
    date: NaiveDate,
    value: Decimal,
}

fn decreases_of(moves: &[DepreciationMove]) -> Vec<Decrease> {
    moves
        .iter()
        .filter(|m| m.kind == MoveKind::ValueDecrease)
        .map(|m| Decrease {
            date: m.date,
            value: m.depreciation_value,
        })
        .collect()
}

/// Stateless generator for depreciation boards.
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// Slack kept after the last period so boundary arithmetic stays in range.
    const CLOSING_MARGIN_MONTHS: u32 = 12;

    /// Checks acquisition parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` when the period count is zero or runs past
    /// the representable calendar, the value is not positive, or salvage and
    /// imported amounts fall outside the value.
    pub fn validate_params(params: &AssetParams) -> Result<(), AssetError> {
        if params.name.trim().is_empty() {
            return Err(AssetError::InvalidParameters("name is required".into()));
        }
        if params.method_number == 0 {
            return Err(AssetError::InvalidParameters(
                "method_number must be at least 1".into(),
            ));
        }
        if params.original_value <= Decimal::ZERO {
            return Err(AssetError::InvalidParameters(
                "original_value must be positive".into(),
            ));
        }
        if params.salvage_value < Decimal::ZERO || params.salvage_value > params.original_value {
            return Err(AssetError::InvalidParameters(
                "salvage_value must be between 0 and original_value".into(),
            ));
        }
        let horizon = params
            .method_period
            .months()
            .checked_mul(params.method_number)
            .and_then(|months| months.checked_add(Self::CLOSING_MARGIN_MONTHS))
            .and_then(|months| params.acquisition_date.checked_add_months(Months::new(months)));
        if horizon.is_none() {
            return Err(AssetError::InvalidParameters(
                "method_number puts the final date beyond the calendar".into(),
            ));
        }
        let depreciable = params.original_value - params.salvage_value;
        let import = params.already_depreciated_amount_import;
        if import < Decimal::ZERO || import > depreciable {
            return Err(AssetError::InvalidParameters(
                "already_depreciated_amount_import must be between 0 and the depreciable value"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Confirms a draft asset: checks it, builds its board and opens it.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyValidated` for a non-draft asset, `InvalidParameters`
    /// for bad parameters, or `ArithmeticInconsistency` if the board cannot
    /// be closed to zero.
    pub fn validate(asset: &mut Asset, ctx: &ScheduleContext) -> Result<(), AssetError> {
        if asset.status != AssetStatus::Draft {
            return Err(AssetError::AlreadyValidated);
        }
        Self::validate_params(&asset.params)?;

        let moves = Self::generate(asset, ctx)?;
        asset.moves = moves;
        asset.status = AssetStatus::Open;
        Ok(())
    }

    /// Builds the full board from the prorata date, ignoring existing moves.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticInconsistency` if the residual cannot be absorbed.
    pub fn generate(
        asset: &Asset,
        ctx: &ScheduleContext,
    ) -> Result<Vec<DepreciationMove>, AssetError> {
        let mut moves = Self::periods(
            asset,
            &[],
            asset.prorata_date(),
            asset.depreciable_base(),
            0,
            ctx,
        )?;
        Self::apply_cumulative(
            &mut moves,
            asset.total_depreciable(),
            asset.params.already_depreciated_amount_import,
        );
        Ok(moves)
    }

    /// Builds the board from `from` onward for a given residual.
    ///
    /// Value decreases already on the asset's board lower each period's
    /// amount. Moves are numbered from `first_sequence`. Cumulative values
    /// are left at zero; the caller fills them in once the moves are merged
    /// with the kept part of the board.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticInconsistency` if the residual cannot be absorbed.
    pub fn build_tail(
        asset: &Asset,
        from: NaiveDate,
        residual: Decimal,
        first_sequence: u32,
        ctx: &ScheduleContext,
    ) -> Result<Vec<DepreciationMove>, AssetError> {
        let decreases = decreases_of(&asset.moves);
        Self::periods(asset, &decreases, from, residual, first_sequence, ctx)
    }

    /// Linear amount for `[period_start, period_end]` given what is left.
    ///
    /// The amount is capped at the residual, and the period reaching the
    /// end of the lifetime takes the whole residual.
    #[must_use]
    pub fn period_amount(
        asset: &Asset,
        period_start: NaiveDate,
        period_end: NaiveDate,
        residual: Decimal,
    ) -> Decimal {
        let decreases = decreases_of(&asset.moves);
        Self::linear_amount(asset, &decreases, period_start, period_end, residual)
    }

    fn linear_amount(
        asset: &Asset,
        decreases: &[Decrease],
        period_start: NaiveDate,
        period_end: NaiveDate,
        residual: Decimal,
    ) -> Decimal {
        let lifetime = asset.lifetime_days();
        if lifetime <= Decimal::ZERO {
            return residual;
        }

        let currency = asset.params.currency;
        let prorata = asset.prorata_date();
        let base = asset.depreciable_base();

        let before = days_between(prorata, previous_day(period_start));
        let until = days_between(prorata, period_end);
        let days = until - before;

        let expected_before = currency.round(base * before / lifetime);
        let spread: Decimal = decreases
            .iter()
            .filter(|d| d.date < period_start)
            .filter_map(|d| {
                let remaining = lifetime - days_between(prorata, d.date);
                (remaining > Decimal::ZERO).then(|| days * d.value / remaining)
            })
            .sum();

        let amount = currency.round(base * until / lifetime - expected_before - spread);
        if amount.abs() > residual.abs() || until >= lifetime {
            residual
        } else {
            amount
        }
    }

    fn periods(
        asset: &Asset,
        decreases: &[Decrease],
        from: NaiveDate,
        residual: Decimal,
        first_sequence: u32,
        ctx: &ScheduleContext,
    ) -> Result<Vec<DepreciationMove>, AssetError> {
        let final_date = asset.final_date();
        let period = asset.params.method_period;
        let lock = ctx.lock();

        let mut moves = Vec::new();
        let mut residual = residual;
        let mut sequence = first_sequence;
        let mut start = from;

        while !residual.is_zero() && start <= final_date {
            let end = end_of_period(start, period);
            let amount = Self::linear_amount(asset, decreases, start, end, residual);
            if !amount.is_zero() {
                let date = clamp_to_unlocked(end, lock);
                moves.push(DepreciationMove::new(
                    MoveKind::Depreciation,
                    sequence,
                    date,
                    (start, end),
                    days_between(start, end),
                    amount,
                    ctx.state_for(date),
                ));
                sequence += 1;
                residual -= amount;
            }
            start = next_day(end);
        }

        Self::reconcile(&mut moves, residual)?;
        Ok(moves)
    }

    /// Folds a leftover residual into the last generated move.
    fn reconcile(moves: &mut [DepreciationMove], residual: Decimal) -> Result<(), AssetError> {
        if residual.is_zero() {
            return Ok(());
        }
        match moves.last_mut() {
            Some(last) if last.depreciation_value + residual >= Decimal::ZERO => {
                last.depreciation_value += residual;
                Ok(())
            }
            _ => Err(AssetError::ArithmeticInconsistency { residual }),
        }
    }

    /// Fills cumulative values along `moves`, starting from `opening_depreciated`.
    pub fn apply_cumulative(
        moves: &mut [DepreciationMove],
        total_depreciable: Decimal,
        opening_depreciated: Decimal,
    ) {
        let mut depreciated = opening_depreciated;
        for mv in moves {
            depreciated += mv.depreciation_value;
            mv.asset_depreciated_value = depreciated;
            mv.asset_remaining_value = total_depreciable - depreciated;
        }
    }
}
