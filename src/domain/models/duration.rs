//! Duration rendering for CLI output.

use chrono::Duration;

/// Renders a duration as `HH:MM:SS`, wrapping around 24 hours; `None`
/// (still running) renders as `--:--`.
pub fn format_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(d) => {
            let total_seconds = d.num_seconds().max(0);
            format!(
                "{:02}:{:02}:{:02}",
                (total_seconds / 3600) % 24,
                (total_seconds / 60) % 60,
                total_seconds % 60
            )
        }
        None => "--:--".to_string(),
    }
}
