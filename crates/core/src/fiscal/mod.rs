//! Fiscal lock dates.
//!
//! Accounting data dated on or before the effective lock date is frozen.
//! New moves that would land inside the locked range are re-dated to the
//! end of the first open month.

pub mod lock;

pub use lock::{LockDates, LockViolation, clamp_to_unlocked, ensure_mutable};
