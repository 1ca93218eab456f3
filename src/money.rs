//! Money Parsing and Formatting
//!
//! Every amount the wallet core handles is a `rust_decimal::Decimal`. User
//! input arrives as free text and is turned into a `Decimal` here; display
//! strings are produced here as well. No other module parses or formats money.
//!
//! ## Usage
//! ```rust
//! use etn_wallet::money::{format_amount, parse_amount};
//!
//! let amount = parse_amount("10.5").unwrap();
//! assert_eq!(format_amount(amount, 3), "10.500");
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Amount parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),

    #[error("Amount must be greater than zero")]
    NotPositive,

    /// Well-formed finite number beyond the range of `Decimal`
    #[error("Amount out of range: {text}")]
    OutOfRange { text: String, negative: bool },
}

// ============================================================================
// Parse: Text → Decimal
// ============================================================================

/// Parse free text into a signed `Decimal`.
///
/// Accepts plain decimal notation (`"12.5"`, `"-3"`) and scientific notation
/// (`"1e3"`). Surrounding whitespace is ignored. `NaN` and infinities are not
/// representable and are rejected as invalid format. A finite number too large
/// for `Decimal` (`"1e30"`) is `OutOfRange`.
pub fn parse_decimal(text: &str) -> Result<Decimal, MoneyError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MoneyError::Empty);
    }

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| classify_unparsed(text))
}

// Decimal rejected the text; tell numbers it cannot hold apart from non-numbers.
fn classify_unparsed(text: &str) -> MoneyError {
    let max = Decimal::MAX.to_f64().unwrap_or(f64::MAX);
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() >= max => MoneyError::OutOfRange {
            text: text.to_string(),
            negative: value.is_sign_negative(),
        },
        _ => MoneyError::InvalidFormat(text.to_string()),
    }
}

/// Parse a user-entered amount, requiring a finite value strictly above zero.
///
/// # Errors
/// * `Empty` - blank input
/// * `InvalidFormat` - not a number
/// * `NotPositive` - zero or negative, including negatives beyond range
/// * `OutOfRange` - positive but too large to represent
pub fn parse_amount(text: &str) -> Result<Decimal, MoneyError> {
    let value = match parse_decimal(text) {
        Err(MoneyError::OutOfRange { negative: true, .. }) => {
            return Err(MoneyError::NotPositive);
        }
        other => other?,
    };
    if value <= Decimal::ZERO {
        return Err(MoneyError::NotPositive);
    }
    Ok(value)
}

// ============================================================================
// Format: Decimal → Display String
// ============================================================================

/// Format with exactly `display_decimals` places, rounding half away from zero.
///
/// ```rust
/// use etn_wallet::money::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(100005, 4), 3), "10.001");
/// assert_eq!(format_amount(Decimal::new(43, 2), 4), "0.4300");
/// ```
pub fn format_amount(value: Decimal, display_decimals: u32) -> String {
    let rounded =
        value.round_dp_with_strategy(display_decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.prec$}", rounded, prec = display_decimals as usize)
}

/// Format without trailing zeros (`5.000` → `5`, `0.2500` → `0.25`).
pub fn format_normalized(value: Decimal) -> String {
    value.normalize().to_string()
}
