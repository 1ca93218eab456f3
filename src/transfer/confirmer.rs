//! Confirmation Sources
//!
//! A confirmer resolves once a submitted transfer is considered final. The
//! workflow does not care how: the only implementation shipped here waits a
//! fixed delay, standing in for block confirmation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::types::TransferRequest;
use crate::logging::TRACE_TARGET;

/// Resolves a submitted transfer
///
/// There is no failure outcome: once `confirm` is awaited it always completes.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Get confirmer name for logging
    fn name(&self) -> &'static str;

    /// Wait until `request` is final
    async fn confirm(&self, request: &TransferRequest);
}

/// Confirms after a fixed delay; no network I/O
#[derive(Debug, Clone)]
pub struct SimulatedConfirmer {
    delay: Duration,
}

impl SimulatedConfirmer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedConfirmer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl Confirmer for SimulatedConfirmer {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn confirm(&self, request: &TransferRequest) {
        debug!(
            target: TRACE_TARGET,
            transfer_id = %request.transfer_id,
            delay_ms = self.delay.as_millis() as u64,
            "Simulating confirmation"
        );
        tokio::time::sleep(self.delay).await;
    }
}
