//! Asset service: repository access around the schedule engine.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use deprecia_shared::types::{AssetId, MoveId};

use super::error::AssetError;
use super::reevaluation::{
    AdjustmentOutcome, ReevaluationInstruction, ReevaluationOutcome, Reevaluator,
};
use super::repository::AssetRepository;
use super::schedule::ScheduleGenerator;
use super::types::{Asset, AssetParams, DepreciationMove, ScheduleContext};

/// Depreciation service for asset lifecycle operations.
///
/// Every operation loads the asset, computes on a private copy and saves
/// only when the whole computation succeeded.
pub struct DepreciationService<R: AssetRepository> {
    repo: Arc<R>,
}

impl<R: AssetRepository> DepreciationService<R> {
    /// Create a new depreciation service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Registers a draft asset.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for inconsistent parameters.
    pub fn create_asset(&self, params: AssetParams) -> Result<Asset, AssetError> {
        ScheduleGenerator::validate_params(&params)?;
        let asset = Asset::new(params);
        self.repo.save_asset(&asset)?;

        info!(
            asset_id = %asset.id,
            name = %asset.params.name,
            original_value = %asset.params.original_value,
            "Asset created"
        );
        Ok(asset)
    }

    /// Confirms a draft asset and generates its board.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound`, `AlreadyValidated`, `InvalidParameters` or
    /// `ArithmeticInconsistency`.
    pub fn validate_asset(
        &self,
        id: AssetId,
        ctx: &ScheduleContext,
    ) -> Result<Asset, AssetError> {
        let mut asset = self.load(id)?;
        ScheduleGenerator::validate(&mut asset, ctx)?;
        self.repo.save_asset(&asset)?;

        info!(
            asset_id = %asset.id,
            moves = asset.moves.len(),
            final_date = %asset.final_date(),
            "Asset validated"
        );
        Ok(asset)
    }

    /// Applies a reevaluation and stores the parent together with any child.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` or any error of [`Reevaluator::reevaluate`].
    /// Nothing is stored on error.
    pub fn reevaluate_asset(
        &self,
        id: AssetId,
        instruction: &ReevaluationInstruction,
        ctx: &ScheduleContext,
    ) -> Result<ReevaluationOutcome, AssetError> {
        let mut asset = self.load(id)?;
        let outcome = match Reevaluator::reevaluate(&mut asset, instruction, ctx) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    asset_id = %id,
                    cutoff = %instruction.date,
                    error_code = err.error_code(),
                    "Reevaluation rejected"
                );
                return Err(err);
            }
        };

        let book_value = asset.book_value();
        match &outcome.adjustment {
            AdjustmentOutcome::Increased { child, .. } => {
                self.repo.commit(&[asset, child.as_ref().clone()])?;
            }
            _ => self.repo.commit(std::slice::from_ref(&asset))?,
        }

        let posted_superseded = outcome.superseded.iter().filter(|m| m.is_posted()).count();
        info!(
            asset_id = %id,
            cutoff = %instruction.date,
            outcome = outcome.adjustment.as_str(),
            residual_at_cutoff = %outcome.residual_at_cutoff,
            book_value = %book_value,
            superseded = outcome.superseded.len(),
            superseded_posted = posted_superseded,
            reason = instruction.reason.as_deref().unwrap_or(""),
            "Asset reevaluated"
        );
        Ok(outcome)
    }

    /// Returns the asset.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` if the asset does not exist.
    pub fn asset(&self, id: AssetId) -> Result<Asset, AssetError> {
        self.load(id)
    }

    /// Returns the board of an asset.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` if the asset does not exist.
    pub fn board(&self, id: AssetId) -> Result<Vec<DepreciationMove>, AssetError> {
        self.repo.load_moves(id)
    }

    /// Returns the assets spawned by increases on `id`.
    pub fn children(&self, id: AssetId) -> Result<Vec<Asset>, AssetError> {
        self.repo.children_of(id)
    }

    /// Posts every draft move dated on or before `as_of`.
    ///
    /// Returns the number of moves posted.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` if the asset does not exist.
    pub fn post_due_moves(&self, id: AssetId, as_of: NaiveDate) -> Result<usize, AssetError> {
        let mut asset = self.load(id)?;
        let posted = asset.post_through(as_of);
        if posted > 0 {
            self.repo.save_moves(id, &asset.moves)?;
            info!(asset_id = %id, as_of = %as_of, posted, "Due moves posted");
        }
        Ok(posted)
    }

    /// Returns a posted move to draft.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound`, `MoveNotFound`, or `LockViolation` when the
    /// move is inside the locked range.
    pub fn reset_move_to_draft(
        &self,
        id: AssetId,
        move_id: MoveId,
        ctx: &ScheduleContext,
    ) -> Result<(), AssetError> {
        let mut asset = self.load(id)?;
        asset.reset_to_draft(move_id, ctx.lock())?;
        self.repo.save_moves(id, &asset.moves)?;

        info!(asset_id = %id, move_id = %move_id, "Move reset to draft");
        Ok(())
    }

    fn load(&self, id: AssetId) -> Result<Asset, AssetError> {
        self.repo
            .load_asset(id)?
            .ok_or(AssetError::AssetNotFound(id))
    }
}
