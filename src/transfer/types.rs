//! Transfer Core Types
//!
//! Type definitions for the transfer workflow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::conversion::ConversionQuote;
use crate::money::{format_amount, format_normalized, parse_decimal};

/// Display precision for transfer totals
pub const TOTAL_DISPLAY_DECIMALS: u32 = 3;

/// Display precision for fiat estimates
pub const FIAT_DISPLAY_DECIMALS: u32 = 2;

/// Transfer ID - ULID assigned when a request is frozen for review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    /// Generate a new unique TransferId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Spendable balance snapshot, fixed for the lifetime of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub available: Decimal,
}

impl WalletBalance {
    pub fn new(available: Decimal) -> Self {
        Self { available }
    }

    /// Whether `total` can be paid out of this balance
    #[inline]
    pub fn covers(&self, total: Decimal) -> bool {
        total <= self.available
    }
}

/// Raw form fields exactly as the user entered them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferDraft {
    pub recipient: String,
    pub amount: String,
}

impl TransferDraft {
    pub fn is_empty(&self) -> bool {
        self.recipient.is_empty() && self.amount.is_empty()
    }
}

/// Validated transfer, frozen when the workflow enters review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub transfer_id: TransferId,
    /// Opaque recipient address (format unchecked)
    pub recipient: String,
    pub amount: Decimal,
    pub fee: Decimal,
    /// `amount + fee`
    pub total: Decimal,
}

impl TransferRequest {
    /// Freeze a request; `total` saturates at `Decimal::MAX`
    pub fn new(recipient: impl Into<String>, amount: Decimal, fee: Decimal) -> Self {
        Self {
            transfer_id: TransferId::new(),
            recipient: recipient.into(),
            amount,
            fee,
            total: amount.saturating_add(fee),
        }
    }

    pub fn total_display(&self) -> String {
        format_amount(self.total, TOTAL_DISPLAY_DECIMALS)
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] -> {} amount={} fee={} total={}",
            self.transfer_id,
            short_address(&self.recipient),
            self.amount,
            self.fee,
            self.total
        )
    }
}

/// Emitted once per transfer on the `SUBMITTING → SUCCEEDED` transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCompleted {
    pub transfer_id: TransferId,
    pub recipient: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub total: Decimal,
    pub completed_at: DateTime<Utc>,
}

impl TransferCompleted {
    pub fn from_request(request: &TransferRequest) -> Self {
        Self {
            transfer_id: request.transfer_id,
            recipient: request.recipient.clone(),
            amount: request.amount,
            fee: request.fee,
            total: request.total,
            completed_at: Utc::now(),
        }
    }

    /// One-line notice, e.g. `Sent 10 ETN to 0x8F12a9...6b1c`
    pub fn summary(&self, unit: &str) -> String {
        format!(
            "Sent {} {} to {}",
            format_normalized(self.amount),
            unit,
            short_address(&self.recipient)
        )
    }
}

impl fmt::Display for TransferCompleted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] completed -> {} amount={} fee={} total={}",
            self.transfer_id,
            short_address(&self.recipient),
            self.amount,
            self.fee,
            self.total
        )
    }
}

/// Live figures shown under the form while composing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPreview {
    pub fee: Decimal,
    /// `amount + fee`, when the amount text is numeric
    pub total: Option<Decimal>,
    /// Amount in the fiat quote's currency, when the amount text is numeric
    pub fiat_equivalent: Option<Decimal>,
    pub fiat_code: String,
}

impl TransferPreview {
    /// Build from raw amount text. Any numeric text produces figures, even
    /// values `review()` would later reject.
    pub fn compute(amount_text: &str, fee: Decimal, fiat: &ConversionQuote) -> Self {
        let amount = parse_decimal(amount_text).ok();
        Self {
            fee,
            total: amount.map(|a| a.saturating_add(fee)),
            fiat_equivalent: amount.map(|a| a.saturating_mul(fiat.rate_to_base)),
            fiat_code: fiat.code.clone(),
        }
    }

    pub fn total_display(&self) -> Option<String> {
        self.total
            .map(|t| format_amount(t, TOTAL_DISPLAY_DECIMALS))
    }

    pub fn fiat_display(&self) -> Option<String> {
        self.fiat_equivalent
            .map(|v| format!("{} {}", format_amount(v, FIAT_DISPLAY_DECIMALS), self.fiat_code))
    }
}

/// Abbreviate an address to its first 8 and last 4 characters
///
/// Applied regardless of length, so short text overlaps: `0xABC` → `0xABC...xABC`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(8).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}
