//! Display helpers for playback time

/// Format seconds as `M:SS`. Minutes are unpadded and never roll over into hours.
///
/// Negative or non-finite input (an unknown duration) renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// `current / total * 100`. Returns 0 when `total` is not a positive finite number.
pub fn calculate_percentage(current: f64, total: f64) -> f64 {
    if !total.is_finite() || total <= 0.0 {
        return 0.0;
    }
    current / total * 100.0
}
