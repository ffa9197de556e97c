use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Parse a timestamp string to `DateTime<FixedOffset>`, trying multiple formats.
///
/// # Supported Formats (in order of precedence)
/// 1. Custom format (if provided) - tries both with timezone and as naive (assumes UTC)
/// 2. RFC3339: `2023-10-06T09:30:21+00:00`
/// 3. ISO 8601 with offset (no colon): `2023-10-06T09:30:21+0000`
/// 4. Milliseconds separated by a colon: `2023-10-06T09:30:21:123+02:00` (written by some older tools)
/// 5. RFC2822: `Fri, 06 Oct 2023 09:30:21 +0000`
/// 6. Naive datetime with fractional seconds: `2023-10-06 09:30:21.890421` (assumes UTC)
/// 7. Naive ISO 8601 with optional fractional seconds: `2023-10-06T09:30:21.348555` (assumes UTC)
///
/// Returns [`None`] if none of the formats match.
pub fn parse_timestamp(time: &str, custom_format: Option<&str>) -> Option<DateTime<FixedOffset>> {
    if let Some(date_format) = custom_format {
        if let Ok(dt) = DateTime::parse_from_str(time, date_format) {
            return Some(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(time, date_format) {
            return Some(dt.and_utc().fixed_offset());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S:%3f%:z") {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(time) {
        return Some(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(time, "%F %T%.f") {
        return Some(dt.and_utc().fixed_offset());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(time, "%FT%T%.f") {
        return Some(dt.and_utc().fixed_offset());
    }

    log::debug!("Failed to parse timestamp: {time}");
    None
}
