//! Display formatting and text-field parsing.
//!
//! Formatting happens only at presentation time; the numbers fed back into
//! conversions are never the formatted strings.

use crate::models::Locale;

/// Decimal places for the infusion rate (mL/h).
pub const RATE_DIGITS: usize = 2;
/// Decimal places for a dose computed from a rate.
pub const DOSE_DIGITS: usize = 3;
/// Decimal places for the concentration summary.
pub const CONCENTRATION_DIGITS: usize = 0;
/// Decimal places for a preparation's drug amount.
pub const AMOUNT_DIGITS: usize = 3;
/// Decimal places for a preparation's volume.
pub const VOLUME_DIGITS: usize = 0;
/// Decimal places for mEq/mL figures in drug detail.
pub const MEQ_PER_ML_DIGITS: usize = 2;
/// Decimal places for U/mL and mcg/mL figures in drug detail.
pub const PER_ML_DIGITS: usize = 0;
/// Upper bound on requested decimal places.
pub const MAX_DIGITS: usize = 10;

/// Format `value` with `digits` decimals for `locale`.
///
/// Absent or non-finite values format as an empty string. Exact halfway
/// values round away from zero (`0.125` → `0.13`). `digits` is capped at
/// [`MAX_DIGITS`]. English keeps the fixed decimals with a point. Other
/// locales use their decimal separator, drop a trailing `,00`, and drop the
/// final zero of a one-digit-plus-zero tail (`,50` → `,5`).
pub fn format_number(value: Option<f64>, digits: usize, locale: Locale) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return String::new();
    };
    let digits = digits.min(MAX_DIGITS);

    let fixed = format!("{:.*}", digits, round_half_away(value, digits));
    if locale == Locale::En {
        return fixed;
    }

    let sep = locale.decimal_separator();
    let mut localized = fixed.replacen('.', &sep.to_string(), 1);
    if let Some(stripped) = localized.strip_suffix(&format!("{}00", sep)) {
        return stripped.to_string();
    }

    let chars: Vec<char> = localized.chars().collect();
    let len = chars.len();
    if len >= 3 && chars[len - 1] == '0' && chars[len - 3] == sep && chars[len - 2].is_ascii_digit()
    {
        localized.pop();
    }
    localized
}

/// Nudge an exact halfway value one ulp away from zero so fixed formatting,
/// which breaks ties to even, rounds it up in magnitude.
///
/// `value` sits halfway at `digits` decimals iff `value * 2^(digits + 1)` is
/// an odd integer. Power-of-two scaling is exact.
fn round_half_away(value: f64, digits: usize) -> f64 {
    let scaled = value * 2f64.powi(digits as i32 + 1);
    let is_tie = scaled.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 != 0.0;
    if is_tie {
        f64::from_bits(value.to_bits() + 1)
    } else {
        value
    }
}

/// Parse a numeric text field as typed by a user.
///
/// Commas are read as decimal points, and when more than one separator is
/// present everything after the first one is kept as fraction digits
/// (`"1.2.3"` and `"1,2,3"` both read 1.23, not 1.2). Empty or non-numeric
/// text is `None`.
pub fn parse_numeric_input(text: &str) -> Option<f64> {
    let normalized = normalize_numeric_input(text);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize a numeric text field without parsing it.
pub fn normalize_numeric_input(text: &str) -> String {
    let replaced = text.trim().replace(',', ".");
    match replaced.split_once('.') {
        Some((whole, fraction)) => format!("{}.{}", whole, fraction.replace('.', "")),
        None => replaced,
    }
}
