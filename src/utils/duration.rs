//! Human-friendly duration parsing for flags and environment variables

use crate::error::{AppError, Result};

/// Parse a duration such as `500ms`, `1s`, `1m30s`, `1.5h` or a bare number
/// of seconds into signed milliseconds.
///
/// A leading `-` is accepted so that `-1` can express "no limit".
pub fn parse_duration_ms(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::parse("Duration cannot be empty"));
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if body.is_empty() || body.starts_with('+') || body.starts_with('-') {
        return Err(AppError::parse(format!("Invalid duration: {}", input)));
    }

    let total_ms = if let Ok(secs) = body.parse::<i64>() {
        secs.checked_mul(1000)
            .ok_or_else(|| AppError::parse(format!("Duration out of range: {}", input)))?
    } else {
        parse_unit_sequence(body).map_err(|reason| {
            AppError::parse(format!("Invalid duration '{}': {}", input, reason))
        })?
    };

    Ok(if negative { -total_ms } else { total_ms })
}

fn parse_unit_sequence(body: &str) -> std::result::Result<i64, String> {
    let is_number_char = |c: char| c.is_ascii_digit() || c == '.';
    let mut total_ms = 0.0_f64;
    let mut rest = body;

    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number_char(c)).unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("expected a number before '{}'", rest));
        }
        let (number, after) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("'{}' is not a number", number))?;

        let unit_len = after.find(is_number_char).unwrap_or(after.len());
        let (unit, remaining) = after.split_at(unit_len);
        let factor = match unit {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            "" => return Err(format!("missing unit after '{}'", number)),
            other => return Err(format!("unknown unit '{}'", other)),
        };

        total_ms += value * factor;
        rest = remaining;
    }

    if !total_ms.is_finite() || total_ms > i64::MAX as f64 {
        return Err("value out of range".to_string());
    }

    Ok(total_ms.round() as i64)
}

/// Render milliseconds back into the shortest unit that represents them exactly.
pub fn format_duration_ms(ms: i64) -> String {
    if ms <= 0 {
        return "unlimited".to_string();
    }
    if ms % 3_600_000 == 0 {
        format!("{}h", ms / 3_600_000)
    } else if ms % 60_000 == 0 {
        format!("{}m", ms / 60_000)
    } else if ms % 1_000 == 0 {
        format!("{}s", ms / 1_000)
    } else {
        format!("{}ms", ms)
    }
}
