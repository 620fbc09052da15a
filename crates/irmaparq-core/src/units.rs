use crate::error::{IngestError, Result};

/// Parse a human-readable byte size like `"1.5 KB"` into bytes.
///
/// Grammar is `<number> <suffix>` with a single space and decimal
/// multipliers (KB = 1000). Sizes are non-negative.
pub fn parse_byte_size(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestError::malformed_unit(input, "empty input"));
    }
    let (number, suffix) = trimmed
        .split_once(' ')
        .ok_or_else(|| IngestError::malformed_unit(input, "missing unit suffix"))?;
    let value: f64 = number
        .parse()
        .map_err(|_| IngestError::malformed_unit(input, "unparsable number"))?;
    if value < 0.0 {
        return Err(IngestError::malformed_unit(input, "negative size"));
    }
    let multiplier = match suffix {
        "B" => 1.0,
        "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        _ => {
            return Err(IngestError::malformed_unit(
                input,
                format!("unknown unit suffix {:?}", suffix),
            ))
        }
    };
    Ok(value * multiplier)
}

/// Parse a trace duration like `"1m2.5s"`, `"45.2s"` or `"340ms"` into
/// seconds.
///
/// A duration is a run of `<number><m|s|ms>` components, optionally
/// whitespace-separated; each component may appear at most once and
/// absent components count as zero. Durations are non-negative.
pub fn parse_duration(input: &str) -> Result<f64> {
    let mut minutes: Option<f64> = None;
    let mut seconds: Option<f64> = None;
    let mut millis: Option<f64> = None;

    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(IngestError::malformed_unit(input, "empty input"));
    }

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return Err(IngestError::malformed_unit(
                input,
                format!("expected a number at {:?}", rest),
            ));
        }
        let value: f64 = rest[..number_end]
            .parse()
            .map_err(|_| IngestError::malformed_unit(input, "unparsable number"))?;
        if value < 0.0 {
            return Err(IngestError::malformed_unit(input, "negative duration"));
        }
        rest = &rest[number_end..];

        // "ms" must win over a bare "m"
        let slot = if let Some(after) = rest.strip_prefix("ms") {
            rest = after;
            &mut millis
        } else if let Some(after) = rest.strip_prefix('m') {
            rest = after;
            &mut minutes
        } else if let Some(after) = rest.strip_prefix('s') {
            rest = after;
            &mut seconds
        } else {
            return Err(IngestError::malformed_unit(
                input,
                format!("missing or unknown unit at {:?}", rest),
            ));
        };
        if slot.replace(value).is_some() {
            return Err(IngestError::malformed_unit(input, "repeated unit component"));
        }
        rest = rest.trim_start();
    }

    Ok(minutes.unwrap_or(0.0) * 60.0 + seconds.unwrap_or(0.0) + millis.unwrap_or(0.0) / 1000.0)
}

/// Parse a `YYYY-MM-DD HH:MM:SS[.fraction]` instant as UTC epoch seconds.
///
/// The fractional part, when present, is discarded.
pub fn parse_timestamp(input: &str) -> Result<i64> {
    let text = input.trim();
    let whole = text.split_once('.').map(|(w, _)| w).unwrap_or(text);
    let datetime = jiff::civil::DateTime::strptime("%Y-%m-%d %H:%M:%S", whole)?;
    Ok(datetime
        .to_zoned(jiff::tz::TimeZone::UTC)?
        .timestamp()
        .as_second())
}

/// Wrap an identifier-like value in single quotes so downstream typing
/// keeps it a string even when it looks numeric.
pub fn quote_identifier(value: &str) -> String {
    format!("'{}'", value)
}
