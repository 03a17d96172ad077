//! Asset error types.
//!
//! Every failure is reported before anything is committed, so an error
//! always leaves the asset and its board exactly as they were.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use deprecia_shared::AppError;
use deprecia_shared::types::{AssetId, MoveId};

use super::types::AssetStatus;
use crate::fiscal::LockViolation;

/// Broad category of an [`AssetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is not acceptable.
    InvalidInstruction,
    /// The request would change locked data.
    LockViolation,
    /// Rounding reconciliation could not close the board.
    ArithmeticInconsistency,
    /// Loading or saving failed.
    Persistence,
}

/// Errors that can occur during schedule generation and reevaluation.
#[derive(Debug, Error)]
pub enum AssetError {
    // ========== Instruction Errors ==========
    /// Reevaluation dated before the asset was acquired.
    #[error("Reevaluation date {date} is before the acquisition date {acquisition_date}")]
    DateBeforeAcquisition {
        /// Requested cutoff.
        date: NaiveDate,
        /// Acquisition date of the asset.
        acquisition_date: NaiveDate,
    },

    /// Reevaluation dated before an existing value adjustment.
    #[error("Reevaluation date {date} is before the last adjustment on {last_adjustment}")]
    BeforeLastAdjustment {
        /// Requested cutoff.
        date: NaiveDate,
        /// Date of the latest adjustment move.
        last_adjustment: NaiveDate,
    },

    /// Draft depreciation exists on or before the cutoff.
    #[error("Draft depreciation dated {0} must be posted before reevaluating")]
    UnpostedDepreciationBefore(NaiveDate),

    /// Value increase without an account to book it against.
    #[error("A value increase requires a counterpart account")]
    MissingCounterpartAccount,

    /// Target residual below zero.
    #[error("Target residual value cannot be negative: {0}")]
    NegativeResidual(Decimal),

    /// Increase dated after the end of the asset's lifetime.
    #[error("No remaining lifetime after {date}: depreciation ends on {final_date}")]
    NoRemainingLifetime {
        /// Requested cutoff.
        date: NaiveDate,
        /// Final depreciation date of the asset.
        final_date: NaiveDate,
    },

    /// Operation requires an open asset.
    #[error("Asset must be open, found {0}")]
    AssetNotOpen(AssetStatus),

    /// Asset already has a board.
    #[error("Asset is already validated")]
    AlreadyValidated,

    /// Acquisition parameters are inconsistent.
    #[error("Invalid asset parameters: {0}")]
    InvalidParameters(String),

    // ========== Lock Errors ==========
    /// A posted move inside the locked range would change.
    #[error(transparent)]
    LockViolation(#[from] LockViolation),

    // ========== Arithmetic Errors ==========
    /// The board could not be closed to a zero residual.
    #[error("Rounding reconciliation failed, residual {residual} left on the board")]
    ArithmeticInconsistency {
        /// Residual that could not be absorbed.
        residual: Decimal,
    },

    // ========== Persistence Errors ==========
    /// Asset not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// Move not found on the asset.
    #[error("Move not found: {0}")]
    MoveNotFound(MoveId),

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AssetError {
    /// Returns the error code for machine-readable output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DateBeforeAcquisition { .. } => "DATE_BEFORE_ACQUISITION",
            Self::BeforeLastAdjustment { .. } => "BEFORE_LAST_ADJUSTMENT",
            Self::UnpostedDepreciationBefore(_) => "UNPOSTED_DEPRECIATION_BEFORE",
            Self::MissingCounterpartAccount => "MISSING_COUNTERPART_ACCOUNT",
            Self::NegativeResidual(_) => "NEGATIVE_RESIDUAL",
            Self::NoRemainingLifetime { .. } => "NO_REMAINING_LIFETIME",
            Self::AssetNotOpen(_) => "ASSET_NOT_OPEN",
            Self::AlreadyValidated => "ALREADY_VALIDATED",
            Self::InvalidParameters(_) => "INVALID_PARAMETERS",
            Self::LockViolation(_) => "LOCK_VIOLATION",
            Self::ArithmeticInconsistency { .. } => "ARITHMETIC_INCONSISTENCY",
            Self::AssetNotFound(_) => "ASSET_NOT_FOUND",
            Self::MoveNotFound(_) => "MOVE_NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the category of the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DateBeforeAcquisition { .. }
            | Self::BeforeLastAdjustment { .. }
            | Self::UnpostedDepreciationBefore(_)
            | Self::MissingCounterpartAccount
            | Self::NegativeResidual(_)
            | Self::NoRemainingLifetime { .. }
            | Self::AssetNotOpen(_)
            | Self::AlreadyValidated
            | Self::InvalidParameters(_) => ErrorKind::InvalidInstruction,
            Self::LockViolation(_) => ErrorKind::LockViolation,
            Self::ArithmeticInconsistency { .. } => ErrorKind::ArithmeticInconsistency,
            Self::AssetNotFound(_) | Self::MoveNotFound(_) | Self::Storage(_) => {
                ErrorKind::Persistence
            }
        }
    }

    /// Returns true if retrying the same call can succeed.
    ///
    /// Schedule computations are deterministic; only storage failures are transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        let message = err.to_string();
        match err {
            AssetError::AssetNotFound(_) | AssetError::MoveNotFound(_) => Self::NotFound(message),
            AssetError::AssetNotOpen(_) | AssetError::AlreadyValidated => {
                Self::BusinessRule(message)
            }
            AssetError::LockViolation(_) => Self::Locked(message),
            AssetError::ArithmeticInconsistency { .. } => Self::Internal(message),
            AssetError::Storage(_) => Self::Storage(message),
            _ => Self::Validation(message),
        }
    }
}
