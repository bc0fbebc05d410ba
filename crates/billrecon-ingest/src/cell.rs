//! Cell-to-text conversion.
//!
//! Reference datasets are compared as text only, so every cell is rendered to
//! a `String` at load time. Missing cells become the empty string.

use calamine::{Data, ExcelDateTime};
use chrono::NaiveTime;

/// Renders a spreadsheet cell as text.
///
/// Integral numbers are written without a fractional part so that identifiers
/// stored as numbers (IMO numbers, ZIP codes) compare equal to their textual
/// form. Date cells are written as ISO 8601 text.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => format_numeric(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => excel_datetime_text(dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Dates without a time of day render as `YYYY-MM-DD`. Durations and
/// serials outside the calendar keep their numeric value.
fn excel_datetime_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return format_numeric(dt.as_f64());
    }
    match dt.as_datetime() {
        Some(value) if value.time() == NaiveTime::MIN => value.format("%Y-%m-%d").to_string(),
        Some(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => format_numeric(dt.as_f64()),
    }
}

/// Formats a floating-point number as a string without trailing zeros after decimal.
///
/// Only trims trailing zeros if the number contains a decimal point.
/// Integer-valued floats like 40.0 are formatted as "40", not "4".
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    // Only trim trailing zeros if there's a decimal point
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}

/// Normalizes a header cell: trims whitespace and a stray BOM, and collapses
/// internal whitespace runs to a single space.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Makes header names usable as unique column names.
///
/// Blank headers become `Unnamed: <index>`; repeated headers get a `.1`,
/// `.2`, ... suffix in order of appearance.
pub fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, header) in raw.iter().enumerate() {
        let base = normalize_header(header);
        let base = if base.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            base
        };
        let mut candidate = base.clone();
        let mut counter = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{counter}");
            counter += 1;
        }
        seen.push(candidate);
    }
    seen
}
