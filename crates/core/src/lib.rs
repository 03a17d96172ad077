//! Core business logic for Deprecia.
//!
//! This crate contains the depreciation schedule engine with ZERO web or
//! database dependencies. Persistence happens behind the
//! [`asset::AssetRepository`] trait.
//!
//! # Modules
//!
//! - `calendar` - 30-day-month day counts, prorata fractions, period boundaries
//! - `fiscal` - Lock dates and the lock-date guard
//! - `asset` - Assets, depreciation moves, schedule generation and reevaluation

pub mod asset;
pub mod calendar;
pub mod fiscal;
