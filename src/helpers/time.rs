use chrono::DateTime;

/// Render epoch seconds as a short UTC timestamp; out-of-range values are shown raw.
pub fn format_epoch(epoch_secs: i64) -> String {
    match DateTime::from_timestamp(epoch_secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => format!("@{epoch_secs}"),
    }
}
