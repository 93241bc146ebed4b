//! Human-readable formatting for sizes, durations and timestamps.

const KIB: f64 = 1024.0;

/// Formats a byte count using 1024-based units with two decimals.
pub fn format_size(bytes: i64) -> String {
    let kb = bytes as f64 / KIB;
    let mb = kb / KIB;
    let gb = mb / KIB;

    if gb >= 1.0 {
        format!("{:.2} GB", gb)
    } else if mb >= 1.0 {
        format!("{:.2} MB", mb)
    } else if kb >= 1.0 {
        format!("{:.2} KB", kb)
    } else {
        format!("{} B", bytes)
    }
}

/// Formats a duration in milliseconds as `MM:SS`, or `HH:MM:SS` past one hour.
pub fn format_duration(millis: i64) -> String {
    if millis <= 0 {
        return "00:00".to_string();
    }
    let total = millis / 1000;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Describes how long ago `timestamp` was, relative to `now` (both Unix seconds).
pub fn relative_time_span(timestamp: i64, now: i64) -> String {
    let diff = now - timestamp;

    match diff {
        d if d < 60 => "Just now".to_string(),
        d if d < 3_600 => format!("{} minutes ago", d / 60),
        d if d < 86_400 => format!("{} hours ago", d / 3_600),
        d if d < 604_800 => format!("{} days ago", d / 86_400),
        d if d < 2_592_000 => format!("{} weeks ago", d / 604_800),
        d if d < 31_536_000 => format!("{} months ago", d / 2_592_000),
        d => format!("{} years ago", d / 31_536_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(-5), "00:00");
        assert_eq!(format_duration(65_000), "01:05");
        assert_eq!(format_duration(3_725_000), "01:02:05");
    }

    #[test]
    fn test_relative_time_span() {
        let now = 1_700_000_000;
        assert_eq!(relative_time_span(now - 10, now), "Just now");
        assert_eq!(relative_time_span(now - 600, now), "10 minutes ago");
        assert_eq!(relative_time_span(now - 7_200, now), "2 hours ago");
        assert_eq!(relative_time_span(now - 3 * 86_400, now), "3 days ago");
        assert_eq!(relative_time_span(now - 14 * 86_400, now), "2 weeks ago");
        assert_eq!(relative_time_span(now - 90 * 86_400, now), "3 months ago");
        assert_eq!(relative_time_span(now - 800 * 86_400, now), "2 years ago");
    }
}
