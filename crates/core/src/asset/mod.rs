//! Fixed-asset depreciation for Deprecia.
//!
//! This module implements depreciation boards, mid-life reevaluations and
//! the service that stores them.
//!
//! # Modules
//!
//! - `types` - Asset domain types (Asset, DepreciationMove, ScheduleContext)
//! - `error` - Asset-specific error types
//! - `schedule` - Board generation and rounding reconciliation
//! - `reevaluation` - Split, decrease, increase and disposal at a cutoff date
//! - `repository` - Persistence boundary and in-memory store
//! - `service` - Load, compute, commit

pub mod error;
pub mod reevaluation;
pub mod repository;
pub mod schedule;
pub mod service;
pub mod types;

#[cfg(test)]
mod reevaluation_props;
#[cfg(test)]
mod schedule_props;

pub use error::{AssetError, ErrorKind};
pub use reevaluation::{
    AdjustmentOutcome, ReevaluationAction, ReevaluationInstruction, ReevaluationOutcome,
    Reevaluator,
};
pub use repository::{AssetRepository, InMemoryAssetRepository};
pub use schedule::ScheduleGenerator;
pub use service::DepreciationService;
pub use types::{
    Asset, AssetParams, AssetStatus, DepreciationMethod, DepreciationMove, MoveKind, MoveState,
    ParentLink, ScheduleContext,
};
