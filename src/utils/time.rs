use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};

/// Returns the current time in seconds since the Unix epoch
pub fn current_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Seconds elapsed between `timestamp` and `now`
///
/// Returns 0 if the timestamp is in the future
pub fn time_since(timestamp: u64, now: u64) -> u64 {
    now.saturating_sub(timestamp)
}

/// Seconds remaining until `timestamp`, 0 once it has passed
pub fn time_until(timestamp: u64, now: u64) -> u64 {
    timestamp.saturating_sub(now)
}

/// Format a time difference in a human-readable format
pub fn format_time_diff(timestamp: u64, now: u64, include_seconds: bool) -> String {
    let diff = time_since(timestamp, now);

    if diff < 60 {
        if include_seconds {
            format!("{} seconds ago", diff)
        } else {
            String::from("just now")
        }
    } else if diff < 3600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86400 {
        format!("{} hours ago", diff / 3600)
    } else {
        format!("{} days ago", diff / 86400)
    }
}

/// Countdown label for a voting window, e.g. `2d 4h left`
pub fn format_time_remaining(end_time: u64, now: u64) -> String {
    let remaining = time_until(end_time, now);
    if remaining == 0 {
        return String::from("Ended");
    }

    let days = remaining / 86400;
    let hours = (remaining % 86400) / 3600;
    let minutes = (remaining % 3600) / 60;

    if days > 0 {
        format!("{}d {}h left", days, hours)
    } else if hours > 0 {
        format!("{}h {}m left", hours, minutes)
    } else if minutes > 0 {
        format!("{}m left", minutes)
    } else {
        format!("{}s left", remaining)
    }
}

/// Render a unix timestamp as `YYYY-MM-DD HH:MM UTC`
pub fn format_timestamp(timestamp: u64) -> String {
    match Utc.timestamp_opt(timestamp as i64, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => String::from("invalid time"),
    }
}
