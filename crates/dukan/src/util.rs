//! Utilities

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the unix epoch
pub fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default()
}
