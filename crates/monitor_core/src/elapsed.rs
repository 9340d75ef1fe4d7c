use chrono::{DateTime, Utc};

pub const ELAPSED_ZERO: &str = "00:00";

/// Whole seconds between `created_at` and `now`, or `None` under clock skew.
pub fn elapsed_seconds(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    u64::try_from(now.signed_duration_since(created_at).num_seconds()).ok()
}

/// `MM:SS`, zero padded. Minutes keep counting past 59.
pub fn format_elapsed(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
