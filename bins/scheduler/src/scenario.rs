//! Scenario files: one asset, its acquisition context and a list of
//! reevaluations applied in order.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use deprecia_core::asset::{
    AdjustmentOutcome, Asset, AssetError, AssetParams, DepreciationService,
    InMemoryAssetRepository, ReevaluationInstruction, ScheduleContext,
};
use deprecia_core::fiscal::LockDates;
use deprecia_shared::ScheduleConfig;
use deprecia_shared::types::{Currency, Money};

/// Input of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Moves dated on or before this date are posted.
    pub as_of: NaiveDate,
    /// Lock dates at validation time.
    #[serde(default)]
    pub lock_dates: LockDates,
    /// Currency of the run; falls back to the configured default.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// The asset to depreciate.
    pub asset: AssetParams,
    /// Reevaluations, applied in order.
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// One reevaluation, optionally under different lock dates.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStep {
    /// The reevaluation itself.
    pub instruction: ReevaluationInstruction,
    /// Lock dates in force for this step; defaults to the scenario's.
    #[serde(default)]
    pub lock_dates: Option<LockDates>,
}

/// Output of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// The asset with its final board.
    pub asset: Asset,
    /// Net book value of the asset after the last step.
    pub book_value: Money,
    /// Assets spawned by increases.
    pub children: Vec<Asset>,
    /// What each step did.
    pub steps: Vec<StepReport>,
}

/// Summary of one applied step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Cutoff date.
    pub date: NaiveDate,
    /// `unchanged`, `decreased`, `increased` or `disposed`.
    pub outcome: &'static str,
    /// Adjustment amount, if any.
    pub amount: Option<Decimal>,
    /// Residual at the cutoff before the adjustment.
    pub residual_at_cutoff: Decimal,
    /// Moves removed from the board.
    pub superseded: usize,
    /// Removed moves that had been posted.
    pub superseded_posted: usize,
}

/// Creates, validates and reevaluates the scenario asset.
///
/// # Errors
///
/// Returns the first error raised by the engine. Steps after it are not run.
pub fn run(scenario: Scenario, defaults: &ScheduleConfig) -> Result<Report, AssetError> {
    let service = DepreciationService::new(Arc::new(InMemoryAssetRepository::new()));
    let ctx = ScheduleContext::new(scenario.as_of)
        .with_lock_dates(scenario.lock_dates)
        .with_auto_post(defaults.auto_post);

    let mut params = scenario.asset;
    params.currency = scenario.currency.unwrap_or(defaults.default_currency);
    let id = service.create_asset(params)?.id;
    service.validate_asset(id, &ctx)?;

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for step in &scenario.steps {
        let step_ctx = step
            .lock_dates
            .map_or(ctx, |lock_dates| ctx.with_lock_dates(lock_dates));
        let outcome = service.reevaluate_asset(id, &step.instruction, &step_ctx)?;
        let amount = match &outcome.adjustment {
            AdjustmentOutcome::Unchanged => None,
            AdjustmentOutcome::Decreased { amount }
            | AdjustmentOutcome::Increased { amount, .. }
            | AdjustmentOutcome::Disposed { amount } => Some(*amount),
        };
        steps.push(StepReport {
            date: step.instruction.date,
            outcome: outcome.adjustment.as_str(),
            amount,
            residual_at_cutoff: outcome.residual_at_cutoff,
            superseded: outcome.superseded.len(),
            superseded_posted: outcome.superseded.iter().filter(|m| m.is_posted()).count(),
        });
    }

    let asset = service.asset(id)?;
    let report = Report {
        book_value: asset.book_value(),
        asset,
        children: service.children(id)?,
        steps,
    };
    info!(
        asset_id = %id,
        book_value = %report.book_value,
        moves = report.asset.moves.len(),
        children = report.children.len(),
        "Scenario complete"
    );
    Ok(report)
}
