//! Mid-life value adjustments.
//!
//! A reevaluation cuts the board at a date, closes the depreciation up to
//! that date with a partial move when needed, books the adjustment and
//! regenerates the rest of the board from the new residual. Period
//! boundaries after the cutoff stay where they were.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use deprecia_shared::types::AccountId;

use super::error::AssetError;
use super::schedule::ScheduleGenerator;
use super::types::{
    Asset, AssetParams, AssetStatus, DepreciationMove, MoveKind, MoveState, ParentLink,
    ScheduleContext,
};
use crate::calendar::{ProrataConvention, days_between, next_day, periods_between};
use crate::fiscal::ensure_mutable;

/// What a reevaluation does at its cutoff date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReevaluationAction {
    /// Re-split the board and optionally move the residual to a new value.
    Modify {
        /// New residual; `None` only re-splits the board.
        #[serde(default)]
        target_residual: Option<Decimal>,
        /// Account an increase is booked against.
        #[serde(default)]
        counterpart_account: Option<AccountId>,
    },
    /// Write off the residual and close the asset.
    Dispose {
        /// Account the loss is booked against.
        loss_account: AccountId,
    },
}

/// A reevaluation request. Consumed immediately; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReevaluationInstruction {
    /// Cutoff date.
    pub date: NaiveDate,
    /// Requested change.
    pub action: ReevaluationAction,
    /// Free-text reason kept in the audit log.
    #[serde(default)]
    pub reason: Option<String>,
}

impl ReevaluationInstruction {
    /// Re-split the board at `date` without changing its value.
    #[must_use]
    pub fn resplit(date: NaiveDate) -> Self {
        Self {
            date,
            action: ReevaluationAction::Modify {
                target_residual: None,
                counterpart_account: None,
            },
            reason: None,
        }
    }

    /// Move the residual to `target_residual` at `date`.
    #[must_use]
    pub fn revalue(date: NaiveDate, target_residual: Decimal) -> Self {
        Self {
            date,
            action: ReevaluationAction::Modify {
                target_residual: Some(target_residual),
                counterpart_account: None,
            },
            reason: None,
        }
    }

    /// Dispose of the asset at `date`.
    #[must_use]
    pub fn dispose(date: NaiveDate, loss_account: AccountId) -> Self {
        Self {
            date,
            action: ReevaluationAction::Dispose { loss_account },
            reason: None,
        }
    }

    /// Sets the counterpart account of a modification.
    #[must_use]
    pub fn with_counterpart(mut self, account: AccountId) -> Self {
        if let ReevaluationAction::Modify {
            counterpart_account,
            ..
        } = &mut self.action
        {
            *counterpart_account = Some(account);
        }
        self
    }

    /// Sets the audit reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// How the value changed at the cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustmentOutcome {
    /// No value change; the board was only re-split.
    Unchanged,
    /// A value-decrease move was booked on the asset.
    Decreased {
        /// Decrease amount.
        amount: Decimal,
    },
    /// A child asset carries the increase on its own board.
    Increased {
        /// Increase amount.
        amount: Decimal,
        /// The new child asset, already open.
        child: Box<Asset>,
    },
    /// The residual was written off and the asset closed.
    Disposed {
        /// Written-off amount.
        amount: Decimal,
    },
}

impl AdjustmentOutcome {
    /// Short label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Decreased { .. } => "decreased",
            Self::Increased { .. } => "increased",
            Self::Disposed { .. } => "disposed",
        }
    }
}

/// Result of a successful reevaluation.
#[derive(Debug, Clone)]
pub struct ReevaluationOutcome {
    /// The value change.
    pub adjustment: AdjustmentOutcome,
    /// Moves removed from the board. Posted ones must be unposted in the ledger.
    pub superseded: Vec<DepreciationMove>,
    /// Residual after depreciation up to the cutoff, before the adjustment.
    pub residual_at_cutoff: Decimal,
}

/// Stateless reevaluation processor.
pub struct Reevaluator;

impl Reevaluator {
    /// Applies `instruction` to `asset`.
    ///
    /// All work happens on a copy; `asset` is only replaced once every step
    /// has succeeded.
    ///
    /// # Errors
    ///
    /// - `AssetNotOpen`, `DateBeforeAcquisition`, `BeforeLastAdjustment`,
    ///   `UnpostedDepreciationBefore`, `NegativeResidual`,
    ///   `MissingCounterpartAccount`, `NoRemainingLifetime` for requests
    ///   the asset cannot take
    /// - `LockViolation` if a posted move inside the lock would be removed
    /// - `ArithmeticInconsistency` if the regenerated board cannot close
    pub fn reevaluate(
        asset: &mut Asset,
        instruction: &ReevaluationInstruction,
        ctx: &ScheduleContext,
    ) -> Result<ReevaluationOutcome, AssetError> {
        Self::check(asset, instruction)?;

        let cutoff = instruction.date;
        let lock = ctx.lock();
        let mut sequence = asset.next_sequence();
        let (kept, superseded): (Vec<_>, Vec<_>) =
            asset.moves.iter().cloned().partition(|m| m.date <= cutoff);
        for mv in &superseded {
            ensure_mutable(mv.date, mv.is_posted(), lock)?;
        }

        let mut working = asset.clone();
        working.moves = kept;
        working.sort_moves();
        let first_new = working.moves.len();
        let opening_depreciated = working.total_depreciable() - working.residual();

        Self::split_at(&mut working, cutoff, &mut sequence, ctx);
        let residual_at_cutoff = working.residual();

        let adjustment =
            Self::adjust(&mut working, instruction, residual_at_cutoff, &mut sequence, ctx)?;

        if !matches!(adjustment, AdjustmentOutcome::Disposed { .. }) {
            let tail = ScheduleGenerator::build_tail(
                &working,
                next_day(cutoff),
                working.residual(),
                sequence,
                ctx,
            )?;
            working.moves.extend(tail);
        }

        let total = working.total_depreciable();
        ScheduleGenerator::apply_cumulative(
            &mut working.moves[first_new..],
            total,
            opening_depreciated,
        );
        working.sort_moves();

        *asset = working;
        Ok(ReevaluationOutcome {
            adjustment,
            superseded,
            residual_at_cutoff,
        })
    }

    fn check(asset: &Asset, instruction: &ReevaluationInstruction) -> Result<(), AssetError> {
        let cutoff = instruction.date;

        if !asset.is_open() {
            return Err(AssetError::AssetNotOpen(asset.status));
        }
        if cutoff < asset.params.acquisition_date {
            return Err(AssetError::DateBeforeAcquisition {
                date: cutoff,
                acquisition_date: asset.params.acquisition_date,
            });
        }
        if let Some(last_adjustment) = asset.last_adjustment_date()
            && cutoff < last_adjustment
        {
            return Err(AssetError::BeforeLastAdjustment {
                date: cutoff,
                last_adjustment,
            });
        }
        let unposted = asset
            .moves
            .iter()
            .filter(|m| {
                m.kind == MoveKind::Depreciation && !m.is_posted() && m.date <= cutoff
            })
            .map(|m| m.date)
            .min();
        if let Some(date) = unposted {
            return Err(AssetError::UnpostedDepreciationBefore(date));
        }
        if let ReevaluationAction::Modify {
            target_residual: Some(target),
            ..
        } = &instruction.action
            && *target < Decimal::ZERO
        {
            return Err(AssetError::NegativeResidual(*target));
        }
        Ok(())
    }

    /// Books depreciation from the end of the kept board up to the cutoff.
    fn split_at(
        working: &mut Asset,
        cutoff: NaiveDate,
        sequence: &mut u32,
        ctx: &ScheduleContext,
    ) {
        let resume = working
            .moves
            .iter()
            .map(|m| m.period_end)
            .max()
            .map_or_else(|| working.prorata_date(), next_day);
        if resume > cutoff {
            return;
        }

        let amount = ScheduleGenerator::period_amount(working, resume, cutoff, working.residual());
        if working.params.currency.is_zero(amount) {
            return;
        }
        working.moves.push(DepreciationMove::new(
            MoveKind::Depreciation,
            *sequence,
            cutoff,
            (resume, cutoff),
            days_between(resume, cutoff),
            amount,
            ctx.state_for(cutoff),
        ));
        *sequence += 1;
    }

    fn adjust(
        working: &mut Asset,
        instruction: &ReevaluationInstruction,
        residual: Decimal,
        sequence: &mut u32,
        ctx: &ScheduleContext,
    ) -> Result<AdjustmentOutcome, AssetError> {
        let cutoff = instruction.date;
        let currency = working.params.currency;

        match &instruction.action {
            ReevaluationAction::Dispose { loss_account } => {
                if !currency.is_zero(residual) {
                    working.moves.push(
                        DepreciationMove::new(
                            MoveKind::Disposal,
                            *sequence,
                            cutoff,
                            (cutoff, cutoff),
                            Decimal::ZERO,
                            residual,
                            MoveState::Draft,
                        )
                        .with_counterpart(Some(*loss_account)),
                    );
                    *sequence += 1;
                }
                working.status = AssetStatus::Closed;
                Ok(AdjustmentOutcome::Disposed { amount: residual })
            }
            ReevaluationAction::Modify {
                target_residual: None,
                ..
            } => Ok(AdjustmentOutcome::Unchanged),
            ReevaluationAction::Modify {
                target_residual: Some(target),
                counterpart_account,
            } => {
                let target = currency.round(*target);
                match target.cmp(&residual) {
                    Ordering::Equal => Ok(AdjustmentOutcome::Unchanged),
                    Ordering::Less => {
                        let amount = residual - target;
                        working.moves.push(
                            DepreciationMove::new(
                                MoveKind::ValueDecrease,
                                *sequence,
                                cutoff,
                                (cutoff, cutoff),
                                Decimal::ZERO,
                                amount,
                                ctx.state_for(cutoff),
                            )
                            .with_counterpart(*counterpart_account),
                        );
                        *sequence += 1;
                        Ok(AdjustmentOutcome::Decreased { amount })
                    }
                    Ordering::Greater => {
                        let account =
                            counterpart_account.ok_or(AssetError::MissingCounterpartAccount)?;
                        let amount = target - residual;
                        let child = Self::spawn_child(working, cutoff, amount, account, ctx)?;
                        Ok(AdjustmentOutcome::Increased {
                            amount,
                            child: Box::new(child),
                        })
                    }
                }
            }
        }
    }

    /// Creates and opens the child asset carrying an increase.
    fn spawn_child(
        parent: &Asset,
        cutoff: NaiveDate,
        amount: Decimal,
        counterpart_account: AccountId,
        ctx: &ScheduleContext,
    ) -> Result<Asset, AssetError> {
        let final_date = parent.final_date();
        let start = next_day(cutoff);
        if start > final_date {
            return Err(AssetError::NoRemainingLifetime {
                date: cutoff,
                final_date,
            });
        }

        let params = AssetParams {
            name: format!("{} (increase)", parent.params.name),
            currency: parent.params.currency,
            acquisition_date: cutoff,
            original_value: amount,
            salvage_value: Decimal::ZERO,
            method: parent.params.method,
            method_number: periods_between(start, final_date, parent.params.method_period),
            method_period: parent.params.method_period,
            prorata_computation_type: ProrataConvention::ConstantPeriods,
            already_depreciated_amount_import: Decimal::ZERO,
        };
        let mut child = Asset::new(params);
        child.parent = Some(ParentLink {
            parent_id: parent.id,
            final_date,
            counterpart_account,
        });
        ScheduleGenerator::validate(&mut child, ctx)?;
        Ok(child)
    }
}
