//! Timestamp parsing and formatting.
//!
//! Chapter markers carry timestamps as `hh:mm:ss` strings, possibly
//! truncated from the left (`2:30`, `45`). Everything downstream works in
//! milliseconds.

use crate::error::{KapitelError, Result};

/// Parse a (possibly truncated) `h:mm:ss` timestamp string into milliseconds.
///
/// Accepts at most three colon-separated parts; each part must be a
/// non-negative integer. `"1:02:03"` -> 3_723_000, `"2:30"` -> 150_000,
/// `"45"` -> 45_000.
pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let parts: Vec<&str> = timestamp.split(':').collect();
    if parts.len() > 3 {
        return Err(KapitelError::MalformedTimestamp(format!(
            "'{}' has more than 3 parts",
            timestamp
        )));
    }

    let mut milliseconds: u64 = 0;
    let mut conversion_factor: u64 = 1000;
    for part in parts.iter().rev() {
        let value: u64 = part.trim().parse().map_err(|_| {
            KapitelError::MalformedTimestamp(format!(
                "'{}' is not a numeric part of '{}'",
                part, timestamp
            ))
        })?;
        milliseconds += conversion_factor * value;
        conversion_factor *= 60;
    }

    Ok(milliseconds)
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_timestamp() {
        assert_eq!(parse_timestamp("1:02:03").unwrap(), 3_723_000);
        assert_eq!(parse_timestamp("00:23:17").unwrap(), 1_397_000);
    }

    #[test]
    fn test_parse_truncated_timestamp() {
        assert_eq!(parse_timestamp("2:30").unwrap(), 150_000);
        assert_eq!(parse_timestamp("45").unwrap(), 45_000);
        assert_eq!(parse_timestamp("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_rejects_too_many_parts() {
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(KapitelError::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(matches!(
            parse_timestamp("1:xx:03"),
            Err(KapitelError::MalformedTimestamp(_))
        ));
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "00:00");
        assert_eq!(format_seconds(65), "01:05");
        assert_eq!(format_seconds(3665), "01:01:05");
    }
}
