//! Transfer Workflow State Definitions

use std::fmt;

/// Transfer workflow states
///
/// ```text
/// COMPOSING ──review──▶ REVIEWING ──confirm──▶ SUBMITTING ──(delay)──▶ SUCCEEDED
///     ▲                     │                                            │
///     └──────edit/cancel────┘                                            │
///     └─────────────────────────────acknowledge/reset────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Fields are being entered
    #[default]
    Composing,

    /// Request frozen, waiting for the user to confirm
    Reviewing,

    /// Confirmation in flight; every command is rejected
    Submitting,

    /// Transfer confirmed; only acknowledge/reset is accepted
    Succeeded,
}

impl TransferState {
    /// Fields may be edited only while composing
    #[inline]
    pub fn is_editable(&self) -> bool {
        matches!(self, TransferState::Composing)
    }

    /// Cancellation is allowed until the request is submitted
    #[inline]
    pub fn is_cancellable(&self) -> bool {
        matches!(self, TransferState::Composing | TransferState::Reviewing)
    }

    /// A frozen request exists exactly in these states
    #[inline]
    pub fn has_frozen_request(&self) -> bool {
        matches!(
            self,
            TransferState::Reviewing | TransferState::Submitting | TransferState::Succeeded
        )
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Composing => "COMPOSING",
            TransferState::Reviewing => "REVIEWING",
            TransferState::Submitting => "SUBMITTING",
            TransferState::Succeeded => "SUCCEEDED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
