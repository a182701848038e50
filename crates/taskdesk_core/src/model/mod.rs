//! Domain records persisted by the TaskDesk store.
//!
//! # Invariants
//! - Users and tasks are identified by UUID v4 values generated at creation.
//! - Timestamps are Unix epoch milliseconds.
//! - Wire field names are camelCase to match the persisted layout.

pub mod task;
pub mod user;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clamps to `0` if the system clock reports a time before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
