// Utility helpers for parsing, text canonicalization and number formatting.
//
// All the "dirty" CSV text handling lives here so the rest of the code can
// assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Source format of `data_ocorrencia_sinistro`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Trim an optional CSV cell, treating blank cells as missing.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Lower-case then title-case a categorical value.
///
/// Title case follows the usual dataframe rule: the first letter of every
/// run of alphabetic characters is upper-cased and the rest lower-cased, so
/// `"PRONTO-socorro"` becomes `"Pronto-Socorro"`. Applying it twice is a
/// no-op.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.trim().chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse a paid amount. Plain and exponent notation (`1.5e3`) are accepted;
/// NaN, infinity and negative values are not.
pub fn parse_amount(s: &str) -> Option<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}

/// Parse a cluster label. Integral floats (`"8.0"`) are accepted because a
/// nullable integer column is usually written out as floats.
pub fn parse_cluster(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Mean paid amount over a set of claims. A profile with no claims has a
/// mean of zero.
pub fn mean_paid<'a>(amounts: impl IntoIterator<Item = &'a f64>) -> f64 {
    let (sum, n) = amounts
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Currency-style display: thousands separators on the whole part, fixed
/// number of decimals.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };
    // Values past u64 range keep their plain digits.
    let grouped = whole
        .parse::<u64>()
        .map(|w| w.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());
    let sign = if n < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Claim and claimant counts as shown on the dashboard.
pub fn format_count(n: usize) -> String {
    n.to_formatted_string(&Locale::en)
}
