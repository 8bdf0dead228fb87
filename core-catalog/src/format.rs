//! Display formatting for durations

/// Format seconds as `M:SS`.
///
/// NaN, infinite and negative inputs render as `0:00`, which is what the
/// transport shows before the device reports a duration.
///
/// ```
/// use core_catalog::format_duration;
///
/// assert_eq!(format_duration(65.9), "1:05");
/// assert_eq!(format_duration(f64::NAN), "0:00");
/// ```
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
