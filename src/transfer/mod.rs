//! Transfer Workflow FSM
//!
//! Composes, validates, reviews and submits a single outgoing transfer.
//!
//! # State Machine
//!
//! ```text
//! COMPOSING → REVIEWING → SUBMITTING → SUCCEEDED
//!     ↑           │                       │
//!     └───────────┴───────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. **Guarded Transitions**: A command from the wrong state is rejected and changes nothing
//! 2. **Validate Before Review**: `amount > 0` and `amount + fee <= available` hold for every frozen request
//! 3. **No Abort**: Once `SUBMITTING`, the confirmation always resolves to `SUCCEEDED`

pub mod confirmer;
pub mod error;
pub mod state;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use confirmer::{Confirmer, SimulatedConfirmer};
pub use error::{Command, TransferError};
pub use state::TransferState;
pub use types::{
    TransferCompleted, TransferDraft, TransferId, TransferPreview, TransferRequest,
    WalletBalance, short_address,
};
pub use workflow::{ConfirmationHandle, TransferEvents, TransferWorkflow};
