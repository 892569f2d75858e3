//! Parsing and display of durations, timestamps and protocol ids.
//!
//! Parsers never fail loudly: anything they cannot read becomes `None`
//! and is left out of numeric reductions downstream.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Default pattern of the `Próximo` timestamp column.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Parse a free-form duration.
///
/// Accepted shapes:
/// - clock: `H:MM:SS`, `HH:MM:SS.fff`, `MM:SS`
/// - a day prefix before a clock: `1 days 00:02:00`, `1 day, 0:02:00`
/// - unit tokens: `1h 2m 3s`, `2 min 15s`, `90s`, `1500ms`
pub fn normalize_duration(raw: &str) -> Option<Duration> {
    let text = raw.trim().to_lowercase();
    if text.is_empty() || matches!(text.as_str(), "nat" | "nan" | "none" | "null") {
        return None;
    }
    if text.starts_with('-') {
        return None;
    }
    let text = text.strip_prefix('+').unwrap_or(&text);

    let ms = if let Some(idx) = text.find("day") {
        let days: i64 = text[..idx].trim().parse().ok()?;
        let rest = text[idx + 3..]
            .trim_start_matches('s')
            .trim_start_matches(',')
            .trim();
        let clock = if rest.is_empty() { 0 } else { parse_clock(rest)? };
        days.checked_mul(MS_PER_DAY)?.checked_add(clock)?
    } else if text.contains(':') {
        parse_clock(text)?
    } else {
        parse_units(text)?
    };

    Some(Duration::milliseconds(ms))
}

/// `H:MM:SS[.fff]` or `MM:SS[.fff]` to milliseconds.
fn parse_clock(text: &str) -> Option<i64> {
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => {
            let minutes: i64 = m.parse().ok()?;
            if minutes >= 60 {
                return None;
            }
            (h.parse::<i64>().ok()?, minutes, *s)
        }
        [m, s] => (0, m.parse::<i64>().ok()?, *s),
        _ => return None,
    };

    let seconds: f64 = seconds.parse().ok()?;
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) || hours < 0 || minutes < 0 {
        return None;
    }

    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
        .checked_add((seconds * MS_PER_SECOND as f64).round() as i64)
}

/// Sequences of `<number><unit>` tokens to milliseconds.
fn parse_units(text: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut chars = text.chars().peekable();
    let mut matched = false;

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ',').is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut number = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            number.push(c);
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut unit = String::new();
        while let Some(c) = chars.next_if(|c| c.is_alphabetic()) {
            unit.push(c);
        }

        let value: f64 = number.parse().ok()?;
        let scale = match unit.as_str() {
            "h" | "hr" | "hrs" | "hour" | "hours" => MS_PER_HOUR,
            "m" | "min" | "mins" | "minute" | "minutes" => MS_PER_MINUTE,
            "s" | "sec" | "secs" | "second" | "seconds" => MS_PER_SECOND,
            "ms" => 1,
            _ => return None,
        };
        let part = value * scale as f64;
        if !part.is_finite() || part > i64::MAX as f64 {
            return None;
        }
        total = total.checked_add(part.round() as i64)?;
        matched = true;
    }

    matched.then_some(total)
}

/// Parse a timestamp against a strftime pattern.
pub fn normalize_timestamp(raw: &str, pattern: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), pattern).ok()
}

/// Calendar day an instant falls on.
pub fn day_bucket(instant: NaiveDateTime) -> NaiveDate {
    instant.date()
}

/// Render as `"<minutes> min <seconds>s"`.
///
/// A missing duration renders as `"0 min"`; this does not mean the
/// duration was zero.
pub fn format_duration(duration: Option<Duration>) -> String {
    match duration {
        None => "0 min".to_string(),
        Some(d) => {
            let total = d.num_seconds();
            format!("{} min {}s", total.div_euclid(60), total.rem_euclid(60))
        }
    }
}

/// Render as `"M:SS"`.
pub fn format_minutes_seconds(duration: Duration) -> String {
    let total = duration.num_milliseconds().div_euclid(MS_PER_SECOND);
    format!("{}:{:02}", total.div_euclid(60), total.rem_euclid(60))
}

/// Strip thousands separators and a trailing `.0` from a protocol id.
pub fn clean_protocol_id(raw: &str) -> String {
    let without_commas = raw.replace(',', "");
    match without_commas.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => without_commas,
    }
}
