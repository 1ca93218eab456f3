//! Transfer Error Types

use thiserror::Error;

use super::state::TransferState;
use crate::money::MoneyError;

/// Workflow commands, as named in transition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetRecipient,
    SetAmount,
    Review,
    Edit,
    Confirm,
    Acknowledge,
    Cancel,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::SetRecipient => "set_recipient",
            Command::SetAmount => "set_amount",
            Command::Review => "review",
            Command::Edit => "edit",
            Command::Confirm => "confirm",
            Command::Acknowledge => "acknowledge",
            Command::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transfer error types
///
/// The first three variants are validation outcomes shown to the user.
/// The rest are contract violations by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Missing information: recipient and amount are required")]
    MissingFields,

    #[error("Invalid amount: enter a valid amount greater than 0")]
    InvalidAmount,

    #[error("Insufficient balance for amount plus network fee")]
    InsufficientBalance,

    // === Contract Errors ===
    #[error("Invalid state transition: {command} not allowed in {state}")]
    InvalidTransition {
        command: Command,
        state: TransferState,
    },

    #[error("Confirmation requires a running Tokio runtime")]
    RuntimeUnavailable,
}

impl TransferError {
    /// Get the error code for display layers
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::MissingFields => "MISSING_FIELDS",
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            TransferError::InvalidTransition { .. } => "INVALID_STATE_TRANSITION",
            TransferError::RuntimeUnavailable => "RUNTIME_UNAVAILABLE",
        }
    }

    /// Validation failures are user-correctable; everything else is a bug
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TransferError::MissingFields
                | TransferError::InvalidAmount
                | TransferError::InsufficientBalance
        )
    }
}

// Presence is checked on the raw text before parsing, so blank amount text
// that reaches the parser is an invalid amount, not a missing one.
impl From<MoneyError> for TransferError {
    fn from(e: MoneyError) -> Self {
        match e {
            MoneyError::Empty | MoneyError::InvalidFormat(_) | MoneyError::NotPositive => {
                TransferError::InvalidAmount
            }
            // Larger than any balance
            MoneyError::OutOfRange { .. } => TransferError::InsufficientBalance,
        }
    }
}
