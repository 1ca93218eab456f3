//! ETN Wallet Core
//!
//! Transfer workflow, currency conversion and receive requests for the ETN
//! demonstration wallet. There is no ledger or network client behind it:
//! balances and quotes are supplied by the caller or by configuration.
//!
//! # Modules
//!
//! - [`transfer`] - Transfer workflow FSM (compose → review → submit → done)
//! - [`conversion`] - Quote book and cross-rate conversion engine
//! - [`receive`] - Payment-request strings for QR codes
//! - [`money`] - Decimal parsing and display formatting
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod logging;
pub mod money;

// Wallet components
pub mod conversion;
pub mod receive;
pub mod transfer;

// Convenient re-exports at crate root
pub use config::{AppConfig, ConfigError, WalletConfig};
pub use conversion::{ConversionQuote, ConversionRequest, QuoteBook, QuoteError};
pub use money::MoneyError;
pub use receive::{ReceiveDescriptor, ReceiveRequestBuilder};
pub use transfer::{
    ConfirmationHandle, TransferCompleted, TransferError, TransferEvents, TransferRequest,
    TransferState, TransferWorkflow, WalletBalance,
};
