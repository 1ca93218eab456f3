//! Currency Conversion
//!
//! Converts amounts between the base token and a set of quoted currencies.
//!
//! ```text
//!            rate(USD)             rate(EUR)
//!   USD ◀──────────────── ETN ────────────────▶ EUR
//!
//!   USD → EUR  =  amount × rate(EUR) / rate(USD)
//! ```

pub mod engine;
pub mod quote;

pub use engine::{
    CONVERSION_DISPLAY_DECIMALS, ConversionRequest, convert, format_converted, get_rate,
    rate_label, swap,
};
pub use quote::{ConversionQuote, QuoteBook, QuoteError};
