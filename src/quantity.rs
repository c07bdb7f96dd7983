//! # Quantity Formatter
//!
//! Converts ingredient quantities between the text a user types (or the
//! backend sends) and the number used in computations.
//!
//! ## Supported input formats
//!
//! - Decimals and integers: `"2"`, `"1.5"`, `".5"`, `"-0.25"`
//! - Fractions: `"1/2"`, `"3/4"`
//! - Mixed numbers: `"1 1/2"`, `"1-1/2"`
//!
//! ## Usage
//!
//! ```rust
//! use meal_planner::quantity::{format_quantity, parse_quantity};
//!
//! assert_eq!(parse_quantity("1 1/2"), Some(1.5));
//! assert_eq!(format_quantity(0.75), "3/4");
//! ```

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

/// Distance from a whole number or a common fraction under which a value
/// snaps to it when formatted.
pub const FORMAT_TOLERANCE: f64 = 0.02;

/// Fractions rendered as text instead of decimals, in ascending order
const COMMON_FRACTIONS: [(f64, &str); 9] = [
    (1.0 / 8.0, "1/8"),
    (1.0 / 4.0, "1/4"),
    (1.0 / 3.0, "1/3"),
    (3.0 / 8.0, "3/8"),
    (1.0 / 2.0, "1/2"),
    (5.0 / 8.0, "5/8"),
    (2.0 / 3.0, "2/3"),
    (3.0 / 4.0, "3/4"),
    (7.0 / 8.0, "7/8"),
];

/// Compiled regex patterns for the accepted quantity shapes
struct QuantityPatterns {
    /// Matches decimals and integers: "2", "1.5", ".5", "-3"
    decimal: Regex,
    /// Matches simple fractions: "1/2", "-3/4"
    fraction: Regex,
    /// Matches mixed numbers: "1 1/2", "1-1/2"
    mixed: Regex,
}

impl QuantityPatterns {
    fn new() -> Self {
        Self {
            decimal: Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$")
                .expect("decimal pattern should be valid"),
            fraction: Regex::new(r"^([+-]?)(\d+)/(\d+)$").expect("fraction pattern should be valid"),
            mixed: Regex::new(r"^([+-]?)(\d+)(?:\s+|-)(\d+)/(\d+)$")
                .expect("mixed number pattern should be valid"),
        }
    }
}

lazy_static! {
    static ref QUANTITY_PATTERNS: QuantityPatterns = QuantityPatterns::new();
}

/// Parse a quantity typed by a user into a number.
///
/// Returns `None` for anything that is not a decimal, a fraction or a mixed
/// number, including empty input and fractions with a zero denominator.
/// `None` means "unparseable" and must never be treated as zero.
pub fn parse_quantity(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if QUANTITY_PATTERNS.decimal.is_match(text) {
        return text.parse::<f64>().ok();
    }

    if let Some(captures) = QUANTITY_PATTERNS.fraction.captures(text) {
        let sign = sign_of(&captures[1]);
        let value = fraction_value(&captures[2], &captures[3])?;
        return Some(sign * value);
    }

    if let Some(captures) = QUANTITY_PATTERNS.mixed.captures(text) {
        let sign = sign_of(&captures[1]);
        let whole: f64 = captures[2].parse().ok()?;
        let fractional = fraction_value(&captures[3], &captures[4])?;
        return Some(sign * (whole + fractional));
    }

    trace!("Rejected quantity text: {text:?}");
    None
}

fn sign_of(prefix: &str) -> f64 {
    if prefix == "-" {
        -1.0
    } else {
        1.0
    }
}

fn fraction_value(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Render a quantity for display.
///
/// Values close to a whole number render as that integer, values whose
/// fractional part is close to a common kitchen fraction render as
/// `"<whole> <fraction>"`, everything else is rounded to two decimals.
/// NaN and infinities render as an empty string.
pub fn format_quantity(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let magnitude = format_magnitude(value.abs());
    if value < 0.0 && magnitude != "0" {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Same as [`format_quantity`], with a missing quantity rendering as `""`.
pub fn format_optional_quantity(value: Option<f64>) -> String {
    value.map(format_quantity).unwrap_or_default()
}

fn format_magnitude(value: f64) -> String {
    let whole = value.floor();
    let fractional = value - whole;

    if fractional < FORMAT_TOLERANCE {
        return format!("{whole:.0}");
    }
    if 1.0 - fractional < FORMAT_TOLERANCE {
        return format!("{:.0}", whole + 1.0);
    }

    for (fraction, text) in COMMON_FRACTIONS {
        if (fractional - fraction).abs() < FORMAT_TOLERANCE {
            return if whole == 0.0 {
                text.to_string()
            } else {
                format!("{whole:.0} {text}")
            };
        }
    }

    let rounded = format!("{value:.2}");
    rounded
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
