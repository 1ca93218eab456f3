//! Receive Requests
//!
//! Builds the payment-request string a QR renderer encodes:
//!
//! ```text
//! etn:<address>                  no amount requested
//! etn:<address>?amount=<n>       amount requested, n > 0
//! ```

use std::fmt;

use rust_decimal::Decimal;

use crate::conversion::ConversionQuote;
use crate::money::{format_amount, format_normalized, parse_amount, parse_decimal};
use crate::transfer::types::FIAT_DISPLAY_DECIMALS;

/// Default URI scheme for the ETN network
pub const DEFAULT_SCHEME: &str = "etn";

/// Address plus optional requested amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveDescriptor {
    pub scheme: String,
    pub address: String,
    /// Only encoded when strictly positive
    pub requested_amount: Option<Decimal>,
}

impl ReceiveDescriptor {
    /// Amount that will actually appear in the string
    pub fn encoded_amount(&self) -> Option<Decimal> {
        self.requested_amount.filter(|a| *a > Decimal::ZERO)
    }
}

impl fmt::Display for ReceiveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.address)?;
        if let Some(amount) = self.encoded_amount() {
            write!(f, "?amount={}", format_normalized(amount))?;
        }
        Ok(())
    }
}

/// Builds canonical receive strings for one scheme
#[derive(Debug, Clone)]
pub struct ReceiveRequestBuilder {
    scheme: String,
}

impl ReceiveRequestBuilder {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn descriptor(
        &self,
        address: impl Into<String>,
        requested_amount: Option<Decimal>,
    ) -> ReceiveDescriptor {
        ReceiveDescriptor {
            scheme: self.scheme.clone(),
            address: address.into(),
            requested_amount,
        }
    }

    /// `scheme:address`, with `?amount=` appended when the amount is above zero
    pub fn build(&self, address: &str, requested_amount: Option<Decimal>) -> String {
        self.descriptor(address, requested_amount).to_string()
    }

    /// Same as [`build`](Self::build) for raw form text; text that is not a
    /// positive number is treated as no amount
    pub fn build_from_text(&self, address: &str, requested_amount: &str) -> String {
        self.build(address, parse_amount(requested_amount).ok())
    }
}

impl Default for ReceiveRequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME)
    }
}

/// Fiat estimate for a requested amount, e.g. `0.02 USD`
pub fn fiat_estimate(requested_amount: &str, fiat: &ConversionQuote) -> Option<String> {
    let amount = parse_decimal(requested_amount).ok()?;
    Some(format!(
        "{} {}",
        format_amount(amount.saturating_mul(fiat.rate_to_base), FIAT_DISPLAY_DECIMALS),
        fiat.code
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_build_with_amount() {
        let builder = ReceiveRequestBuilder::default();
        assert_eq!(builder.build("0xABC", Some(d("5"))), "etn:0xABC?amount=5");
        assert_eq!(
            builder.build("0xABC", Some(d("0.250"))),
            "etn:0xABC?amount=0.25"
        );
    }

    #[test]
    fn test_build_without_amount() {
        let builder = ReceiveRequestBuilder::default();
        assert_eq!(builder.build("0xABC", None), "etn:0xABC");
        assert_eq!(builder.build("0xABC", Some(Decimal::ZERO)), "etn:0xABC");
        assert_eq!(builder.build("0xABC", Some(d("-3"))), "etn:0xABC");
    }

    #[test]
    fn test_build_from_text() {
        let builder = ReceiveRequestBuilder::default();
        assert_eq!(builder.build_from_text("0xABC", "12.5"), "etn:0xABC?amount=12.5");
        assert_eq!(builder.build_from_text("0xABC", ""), "etn:0xABC");
        assert_eq!(builder.build_from_text("0xABC", "abc"), "etn:0xABC");
    }

    #[test]
    fn test_custom_scheme() {
        let builder = ReceiveRequestBuilder::new("electroneum");
        assert_eq!(builder.scheme(), "electroneum");
        assert_eq!(builder.build("0xABC", None), "electroneum:0xABC");
    }

    #[test]
    fn test_descriptor_encoded_amount() {
        let builder = ReceiveRequestBuilder::default();
        let descriptor = builder.descriptor("0xABC", Some(Decimal::ZERO));
        assert_eq!(descriptor.requested_amount, Some(Decimal::ZERO));
        assert!(descriptor.encoded_amount().is_none());
    }

    #[test]
    fn test_fiat_estimate() {
        let usd = ConversionQuote::new("USD", "US Dollar", d("0.0043")).unwrap();
        assert_eq!(fiat_estimate("5", &usd).as_deref(), Some("0.02 USD"));
        assert_eq!(fiat_estimate("1000", &usd).as_deref(), Some("4.30 USD"));
        assert!(fiat_estimate("", &usd).is_none());
    }
}
