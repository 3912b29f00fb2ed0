//! ETA string formatting for the `time(eta: str)` progress callback
//! (spec.md §6).

/// Formats an estimated-seconds-remaining value the way the original
/// progress bar does: `"??:??"` when unknown, `"MM:SS"` under an hour, else
/// `"HH:MM:SS"`.
pub fn format_eta(eta_secs: Option<f64>) -> String {
    let Some(secs) = eta_secs else {
        return "??:??".to_string();
    };
    if !secs.is_finite() || secs < 0.0 {
        return "??:??".to_string();
    }
    let total = secs.round() as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_eta_renders_placeholder() {
        assert_eq!(format_eta(None), "??:??");
    }

    #[test]
    fn under_an_hour_renders_mm_ss() {
        assert_eq!(format_eta(Some(65.0)), "01:05");
        assert_eq!(format_eta(Some(0.0)), "00:00");
    }

    #[test]
    fn an_hour_or_more_renders_hh_mm_ss() {
        assert_eq!(format_eta(Some(3661.0)), "01:01:01");
    }

    #[test]
    fn negative_or_nan_renders_placeholder() {
        assert_eq!(format_eta(Some(-1.0)), "??:??");
        assert_eq!(format_eta(Some(f64::NAN)), "??:??");
    }
}
