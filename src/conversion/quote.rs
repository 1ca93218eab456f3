//! Quote Book
//!
//! Validated set of currency quotes relative to the base token.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quote book construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Quote code is empty")]
    EmptyCode,

    #[error("Quote {code} has non-positive rate {rate}")]
    NonPositiveRate { code: String, rate: Decimal },

    #[error("Duplicate quote code: {0}")]
    DuplicateCode(String),

    #[error("Base code {0} cannot be quoted against itself")]
    BaseCodeQuoted(String),
}

/// A currency code paired with its rate against the base token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionQuote {
    /// Currency identifier, e.g. `USD`
    pub code: String,
    /// Display name, e.g. `US Dollar`
    #[serde(default)]
    pub name: String,
    /// Units of this currency per 1 base token
    pub rate_to_base: Decimal,
}

impl ConversionQuote {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        rate_to_base: Decimal,
    ) -> Result<Self, QuoteError> {
        let quote = Self {
            code: code.into(),
            name: name.into(),
            rate_to_base,
        };
        quote.check()?;
        Ok(quote)
    }

    fn check(&self) -> Result<(), QuoteError> {
        if self.code.trim().is_empty() {
            return Err(QuoteError::EmptyCode);
        }
        if self.rate_to_base <= Decimal::ZERO {
            return Err(QuoteError::NonPositiveRate {
                code: self.code.clone(),
                rate: self.rate_to_base,
            });
        }
        Ok(())
    }
}

/// Quotes keyed by code, in the order they were supplied
///
/// Invariants: every rate is strictly positive, codes are unique, and the
/// base code itself is never quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteBook {
    base_code: String,
    quotes: Vec<ConversionQuote>,
}

impl QuoteBook {
    pub fn new(
        base_code: impl Into<String>,
        quotes: Vec<ConversionQuote>,
    ) -> Result<Self, QuoteError> {
        let base_code = base_code.into();
        for (i, quote) in quotes.iter().enumerate() {
            quote.check()?;
            if quote.code == base_code {
                return Err(QuoteError::BaseCodeQuoted(base_code));
            }
            if quotes[..i].iter().any(|q| q.code == quote.code) {
                return Err(QuoteError::DuplicateCode(quote.code.clone()));
            }
        }
        Ok(Self { base_code, quotes })
    }

    /// A book with no quotes: only base-to-base conversion is meaningful
    pub fn empty(base_code: impl Into<String>) -> Self {
        Self {
            base_code: base_code.into(),
            quotes: Vec::new(),
        }
    }

    /// Built-in demo market: USD, EUR, GBP and JPY
    pub fn demo(base_code: impl Into<String>) -> Result<Self, QuoteError> {
        let quotes = vec![
            ConversionQuote::new("USD", "US Dollar", Decimal::new(5, 3))?,
            ConversionQuote::new("EUR", "Euro", Decimal::new(45, 4))?,
            ConversionQuote::new("GBP", "British Pound", Decimal::new(4, 3))?,
            ConversionQuote::new("JPY", "Japanese Yen", Decimal::new(7, 1))?,
        ];
        Self::new(base_code, quotes)
    }

    pub fn base_code(&self) -> &str {
        &self.base_code
    }

    pub fn get(&self, code: &str) -> Option<&ConversionQuote> {
        self.quotes.iter().find(|q| q.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversionQuote> {
        self.quotes.iter()
    }

    /// Every selectable code: the base first, then each quote
    pub fn codes(&self) -> Vec<&str> {
        std::iter::once(self.base_code.as_str())
            .chain(self.quotes.iter().map(|q| q.code.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
