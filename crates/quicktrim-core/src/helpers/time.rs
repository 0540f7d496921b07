// crates/quicktrim-core/src/helpers/time.rs
//
// Time formatting for the trim overlay (current / start / end readouts).

/// Format a time in seconds as `MM:SS.cc` (minutes, seconds, hundredths).
///
/// ```
/// use quicktrim_core::helpers::time::format_time;
/// assert_eq!(format_time(0.0),    "00:00.00");
/// assert_eq!(format_time(61.5),   "01:01.50");
/// assert_eq!(format_time(119.99), "01:59.99");
/// ```
pub fn format_time(seconds: f64) -> String {
    // Work in whole centiseconds; truncating the f64 fields separately
    // drops a hundredth on values like 119.99.
    let total = (seconds.max(0.0) * 100.0).round() as u64;
    let m  = total / 6000;
    let s  = (total / 100) % 60;
    let cc = total % 100;
    format!("{m:02}:{s:02}.{cc:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_precision() {
        assert_eq!(format_time(12.34), "00:12.34");
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        assert_eq!(format_time(-0.5), "00:00.00");
    }

    #[test]
    fn rolls_over_minutes() {
        assert_eq!(format_time(600.0), "10:00.00");
    }
}
