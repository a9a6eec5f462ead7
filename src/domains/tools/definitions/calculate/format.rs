//! Rendering of numeric results.

use std::fmt;

/// Denominator used when approximating a value as a fraction.
const FRACTION_DENOMINATOR: i64 = 1_000_000;

/// Output format for a calculation result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultFormat {
    /// Whole numbers without a fractional part, others as plain decimals.
    #[default]
    Decimal,
    /// Two-digit mantissa with a signed exponent, e.g. `1.23e+04`.
    Scientific,
    /// Ratio over 1,000,000 reduced to lowest terms. Values too large for
    /// that ratio are rendered as decimals.
    Fraction,
    /// Rounded to the nearest whole number.
    Integer,
}

impl ResultFormat {
    /// Resolve a format name, case-insensitively. Unknown names yield
    /// [`ResultFormat::Decimal`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "scientific" => Self::Scientific,
            "fraction" => Self::Fraction,
            "integer" => Self::Integer,
            _ => Self::Decimal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::Scientific => "scientific",
            Self::Fraction => "fraction",
            Self::Integer => "integer",
        }
    }

    /// Render `value` in this format.
    pub fn apply(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }

        match self {
            Self::Decimal => format_decimal(value),
            Self::Scientific => format_scientific(value),
            Self::Fraction => format_fraction(value),
            Self::Integer => format_whole(value.round()),
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn format_decimal(value: f64) -> String {
    if value == value.floor() {
        format_whole(value)
    } else {
        value.to_string()
    }
}

fn format_whole(value: f64) -> String {
    if value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        format!("{value:.0}")
    }
}

fn format_scientific(value: f64) -> String {
    let rendered = format!("{value:.2e}");
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.abs())
}

fn format_fraction(value: f64) -> String {
    if value == value.floor() {
        return format_whole(value);
    }

    let scaled = (value * FRACTION_DENOMINATOR as f64).round();
    if scaled.abs() >= i64::MAX as f64 {
        return format_decimal(value);
    }

    let mut numerator = scaled as i64;
    let mut denominator = FRACTION_DENOMINATOR;

    let divisor = gcd(numerator.abs(), denominator);
    numerator /= divisor;
    denominator /= divisor;

    if denominator == 1 {
        numerator.to_string()
    } else {
        format!("{numerator}/{denominator}")
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
