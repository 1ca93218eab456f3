use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::conversion::{ConversionQuote, QuoteBook, QuoteError};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<QuoteError> for ConfigError {
    fn from(e: QuoteError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Wallet core settings: token identity, fee schedule and mock market data
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WalletConfig {
    /// Base token code, the reference point for every conversion
    pub base_code: String,
    /// URI scheme for receive requests
    pub scheme: String,
    /// Flat network fee charged per transfer, in base units
    pub fee: Decimal,
    /// Fiat currency used for the "≈ $x" estimate
    pub fiat_code: String,
    /// Fiat units per 1 base token
    pub fiat_rate: Decimal,
    /// Simulated confirmation delay for submitted transfers
    pub confirm_delay_ms: u64,
    /// This wallet's own receive address
    pub address: String,
    /// Spendable balance snapshot handed to each transfer workflow
    pub available_balance: Decimal,
    /// Quoted currencies; empty means the built-in demo quotes
    pub quotes: Vec<ConversionQuote>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            base_code: "ETN".to_string(),
            scheme: "etn".to_string(),
            fee: Decimal::new(1, 3),
            fiat_code: "USD".to_string(),
            fiat_rate: Decimal::new(43, 4),
            confirm_delay_ms: 1500,
            address: "0x8F12a90C04f87ad658f1Ed3099cB3E9858cb6b1c".to_string(),
            available_balance: Decimal::new(23145, 2),
            quotes: Vec::new(),
        }
    }
}

impl WalletConfig {
    /// Build the validated quote book for this wallet
    pub fn quote_book(&self) -> Result<QuoteBook, QuoteError> {
        if self.quotes.is_empty() {
            QuoteBook::demo(&self.base_code)
        } else {
            QuoteBook::new(&self.base_code, self.quotes.clone())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_code.trim().is_empty() {
            return Err(ConfigError::Invalid("base_code is empty".into()));
        }
        if self.scheme.trim().is_empty() {
            return Err(ConfigError::Invalid("scheme is empty".into()));
        }
        if self.fee.is_sign_negative() {
            return Err(ConfigError::Invalid(format!("fee is negative: {}", self.fee)));
        }
        if self.fiat_rate <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "fiat_rate must be positive: {}",
                self.fiat_rate
            )));
        }
        if self.available_balance.is_sign_negative() {
            return Err(ConfigError::Invalid(format!(
                "available_balance is negative: {}",
                self.available_balance
            )));
        }
        self.quote_book()?;
        Ok(())
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::from_file(format!("config/{}.yaml", env))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.wallet.validate()?;
        Ok(config)
    }
}
