//! Time formatting helpers.

use ballot_types::Timestamp;

/// Format a duration in seconds to a compact human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Countdown text for a voting window ending at `end`.
///
/// Minute resolution; the largest non-zero unit decides which units appear.
pub fn format_time_left(end: Timestamp, now: Timestamp) -> String {
    if now >= end {
        return "Voting has ended".to_string();
    }
    let diff = end.remaining_from(now);
    let days = diff / 86_400;
    let hours = (diff % 86_400) / 3_600;
    let minutes = (diff % 3_600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m remaining")
    } else if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else {
        format!("{minutes}m remaining")
    }
}
