use std::time::Duration;

use chrono::{DateTime, Local};

/// Format an uptime like "3d 4h 05m", "4h 05m" or "5m"
pub fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {:02}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format accumulated playtime in seconds
pub fn format_playtime(secs: u64) -> String {
    if secs == 0 {
        "-".to_string()
    } else if secs < 60 {
        format!("{}s", secs)
    } else {
        format_uptime(Duration::from_secs(secs))
    }
}

/// Format a Unix timestamp as local "YYYY-MM-DD HH:MM:SS"
pub fn format_timestamp(ts: Option<i64>) -> String {
    ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

/// Make text safe to put on a terminal.
///
/// Line breaks and tabs become spaces; every other control character,
/// including the ESC that starts a terminal escape sequence, is removed.
pub fn printable(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\r' | '\n' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(59)), "0m");
        assert_eq!(format_uptime(Duration::from_secs(5 * 60)), "5m");
        assert_eq!(format_uptime(Duration::from_secs(4 * 3600 + 5 * 60)), "4h 05m");
        assert_eq!(
            format_uptime(Duration::from_secs(3 * 86_400 + 4 * 3600 + 7 * 60)),
            "3d 4h 07m"
        );
    }

    #[test]
    fn test_format_playtime() {
        assert_eq!(format_playtime(0), "-");
        assert_eq!(format_playtime(42), "42s");
        assert_eq!(format_playtime(3 * 3600), "3h 00m");
    }

    #[test]
    fn test_format_timestamp_missing() {
        assert_eq!(format_timestamp(None), "-");
        assert_eq!(format_timestamp(Some(1_700_000_000)).len(), 19);
    }

    #[test]
    fn test_printable_strips_escape_sequences() {
        assert_eq!(printable("A\x1b]0;pwned\x07\x1b[2JB"), "A]0;pwned[2JB");
        assert_eq!(printable("one\r\ntwo\tthree"), "one  two three");
        assert_eq!(printable("<b>héllo</b>"), "<b>héllo</b>");
    }
}
