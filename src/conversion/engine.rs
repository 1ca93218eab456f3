//! Conversion Engine
//!
//! Pure functions over a [`QuoteBook`]. Every rate is expressed relative to
//! the base token, so a conversion between two quoted currencies is
//! normalised through the base.
//!
//! Fallback rules differ by branch:
//! - base → quote, quote → base: unknown code yields `0`
//! - anything else (base → base, quote → quote): unknown code counts as rate `1`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::quote::QuoteBook;
use crate::money::format_amount;

/// Display precision for converted amounts and rates
pub const CONVERSION_DISPLAY_DECIMALS: u32 = 4;

/// Amount to convert between two codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub from_code: String,
    pub to_code: String,
}

impl ConversionRequest {
    pub fn new(amount: Decimal, from_code: impl Into<String>, to_code: impl Into<String>) -> Self {
        Self {
            amount,
            from_code: from_code.into(),
            to_code: to_code.into(),
        }
    }

    /// Same amount, direction reversed
    pub fn swapped(&self) -> Self {
        swap(self)
    }
}

/// Exchange `from_code` and `to_code`, keeping the amount.
///
/// No recomputation happens here; the caller converts the new request.
pub fn swap(request: &ConversionRequest) -> ConversionRequest {
    ConversionRequest {
        amount: request.amount,
        from_code: request.to_code.clone(),
        to_code: request.from_code.clone(),
    }
}

/// Units of `to_code` per 1 unit of `from_code`
pub fn get_rate(from_code: &str, to_code: &str, quotes: &QuoteBook) -> Decimal {
    let base = quotes.base_code();

    if from_code == base && to_code != base {
        match quotes.get(to_code) {
            Some(quote) => quote.rate_to_base,
            None => {
                debug!(to = %to_code, "No quote for target currency");
                Decimal::ZERO
            }
        }
    } else if from_code != base && to_code == base {
        match quotes.get(from_code) {
            Some(quote) => ratio(Decimal::ONE, quote.rate_to_base),
            None => {
                debug!(from = %from_code, "No quote for source currency");
                Decimal::ZERO
            }
        }
    } else {
        let from_rate = quotes
            .get(from_code)
            .map_or(Decimal::ONE, |q| q.rate_to_base);
        let to_rate = quotes.get(to_code).map_or(Decimal::ONE, |q| q.rate_to_base);
        ratio(to_rate, from_rate)
    }
}

/// Converted amount, unrounded
pub fn convert(request: &ConversionRequest, quotes: &QuoteBook) -> Decimal {
    let rate = get_rate(&request.from_code, &request.to_code, quotes);
    request.amount.saturating_mul(rate)
}

/// Converted amount rendered to 4 decimal places
pub fn format_converted(request: &ConversionRequest, quotes: &QuoteBook) -> String {
    format_amount(convert(request, quotes), CONVERSION_DISPLAY_DECIMALS)
}

/// `"1 FROM = X TO"` with X to 4 decimal places
pub fn rate_label(from_code: &str, to_code: &str, quotes: &QuoteBook) -> String {
    format!(
        "1 {} = {} {}",
        from_code,
        format_amount(get_rate(from_code, to_code, quotes), CONVERSION_DISPLAY_DECIMALS),
        to_code
    )
}

// Rates in a QuoteBook are strictly positive, so only overflow can fail here.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::MAX)
}
