//! Template environment construction
//!
//! One shared `minijinja::Environment` per engine, configured with strict
//! undefined handling (typos in expressions fail loudly instead of rendering
//! as empty strings) and a couple of spreadsheet-oriented filters.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use minijinja::value::Value;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};

/// Build the engine's expression environment.
pub fn template_env() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_filter("date", date_filter);
    env.add_filter("number_format", number_format_filter);
    env
}

/// Parse a datetime from the handful of string shapes cells carry.
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?);
    }
    None
}

/// `{{ value | date("%d %b %Y") }}` — reformat a date-like string.
fn date_filter(value: Value, format: Option<String>) -> Result<String, minijinja::Error> {
    let format = format.unwrap_or_else(|| "%Y-%m-%d".to_string());
    let text = value.as_str().ok_or_else(|| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("date filter expects a string, got {}", value.kind()),
        )
    })?;
    let dt = parse_datetime(text).ok_or_else(|| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot parse '{text}' as a date"),
        )
    })?;
    Ok(dt.format(&format).to_string())
}

/// `{{ value | number_format(2, " ") }}` — fixed decimals plus a thousands
/// separator (default `,`; pass an empty string to disable grouping).
fn number_format_filter(value: f64, decimals: Option<u32>, thousands: Option<String>) -> String {
    let decimals = decimals.unwrap_or(2) as usize;
    let thousands = thousands.unwrap_or_else(|| ",".to_string());
    let formatted = format!("{value:.decimals$}");
    let (number, fraction) = match formatted.split_once('.') {
        Some((n, f)) => (n, Some(f)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && !thousands.is_empty() && (digits.len() - i) % 3 == 0 {
            grouped.push_str(&thousands);
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
