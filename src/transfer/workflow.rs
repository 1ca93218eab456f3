//! Transfer Workflow
//!
//! Drives one outgoing transfer through its lifecycle. All transitions are
//! methods on [`TransferWorkflow`]; a command issued from a state that does
//! not permit it is rejected with `InvalidTransition` and changes nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::confirmer::{Confirmer, SimulatedConfirmer};
use super::error::{Command, TransferError};
use super::state::TransferState;
use super::types::{
    TransferCompleted, TransferDraft, TransferId, TransferPreview, TransferRequest, WalletBalance,
};
use crate::config::WalletConfig;
use crate::conversion::{ConversionQuote, QuoteError};
use crate::logging::TRACE_TARGET;
use crate::money::parse_amount;

/// Mutable part of the workflow, guarded by one mutex
#[derive(Debug, Default)]
struct WorkflowInner {
    state: TransferState,
    draft: TransferDraft,
    request: Option<TransferRequest>,
    last_error: Option<TransferError>,
}

impl WorkflowInner {
    fn clear(&mut self) {
        self.state = TransferState::Composing;
        self.draft = TransferDraft::default();
        self.request = None;
        self.last_error = None;
    }
}

/// Receiving side for `TransferCompleted` events
pub struct TransferEvents {
    rx: mpsc::UnboundedReceiver<TransferCompleted>,
}

impl TransferEvents {
    /// Wait for the next completed transfer
    ///
    /// Returns `None` once every workflow handle and pending confirmation is gone.
    pub async fn recv(&mut self) -> Option<TransferCompleted> {
        self.rx.recv().await
    }

    /// Take a completed transfer if one is queued (non-blocking)
    pub fn try_recv(&mut self) -> Option<TransferCompleted> {
        self.rx.try_recv().ok()
    }
}

/// Pending confirmation started by [`TransferWorkflow::confirm`]
///
/// Dropping the handle does not cancel the confirmation.
pub struct ConfirmationHandle {
    transfer_id: TransferId,
    task: JoinHandle<TransferCompleted>,
}

impl ConfirmationHandle {
    pub fn transfer_id(&self) -> TransferId {
        self.transfer_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the confirmation to resolve
    ///
    /// Returns `None` only if the runtime shut down before it finished.
    pub async fn wait(self) -> Option<TransferCompleted> {
        match self.task.await {
            Ok(event) => Some(event),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => None,
        }
    }
}

/// State container for a single in-flight transfer
///
/// Cloning yields another handle to the same workflow; commands are meant to
/// come from one logical caller at a time.
#[derive(Clone)]
pub struct TransferWorkflow {
    inner: Arc<Mutex<WorkflowInner>>,
    balance: WalletBalance,
    fee: Decimal,
    fiat: ConversionQuote,
    confirmer: Arc<dyn Confirmer>,
    events: mpsc::UnboundedSender<TransferCompleted>,
}

impl TransferWorkflow {
    /// Create a workflow in `COMPOSING` with the default simulated confirmer
    pub fn new(
        balance: WalletBalance,
        fee: Decimal,
        fiat: ConversionQuote,
    ) -> (Self, TransferEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let workflow = Self {
            inner: Arc::new(Mutex::new(WorkflowInner::default())),
            balance,
            fee,
            fiat,
            confirmer: Arc::new(SimulatedConfirmer::default()),
            events: tx,
        };
        (workflow, TransferEvents { rx })
    }

    /// Create a workflow from wallet settings
    pub fn from_config(config: &WalletConfig) -> Result<(Self, TransferEvents), QuoteError> {
        let fiat = ConversionQuote::new(&config.fiat_code, &config.fiat_code, config.fiat_rate)?;
        let (workflow, events) = Self::new(
            WalletBalance::new(config.available_balance),
            config.fee,
            fiat,
        );
        let confirmer =
            SimulatedConfirmer::new(Duration::from_millis(config.confirm_delay_ms));
        Ok((workflow.with_confirmer(Arc::new(confirmer)), events))
    }

    /// Replace the confirmation source
    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> TransferState {
        self.lock().state
    }

    pub fn draft(&self) -> TransferDraft {
        self.lock().draft.clone()
    }

    /// Frozen request, present from `REVIEWING` through `SUCCEEDED`
    pub fn request(&self) -> Option<TransferRequest> {
        self.lock().request.clone()
    }

    /// Most recent validation failure from `review()`
    pub fn last_error(&self) -> Option<TransferError> {
        self.lock().last_error.clone()
    }

    pub fn balance(&self) -> WalletBalance {
        self.balance
    }

    pub fn fee(&self) -> Decimal {
        self.fee
    }

    /// Fee, total and fiat estimate for the current amount text
    pub fn preview(&self) -> TransferPreview {
        let amount = self.lock().draft.amount.clone();
        TransferPreview::compute(&amount, self.fee, &self.fiat)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Store the recipient text as entered
    pub fn set_recipient(&self, recipient: impl Into<String>) -> Result<(), TransferError> {
        let mut inner = self.lock();
        Self::require(&inner, Command::SetRecipient, TransferState::is_editable)?;
        inner.draft.recipient = recipient.into();
        inner.last_error = None;
        debug!(target: TRACE_TARGET, recipient = %inner.draft.recipient, "Recipient updated");
        Ok(())
    }

    /// Store the amount text as entered; parsed only at `review()`
    pub fn set_amount(&self, amount: impl Into<String>) -> Result<(), TransferError> {
        let mut inner = self.lock();
        Self::require(&inner, Command::SetAmount, TransferState::is_editable)?;
        inner.draft.amount = amount.into();
        inner.last_error = None;
        debug!(target: TRACE_TARGET, amount = %inner.draft.amount, "Amount updated");
        Ok(())
    }

    /// Validate the draft and freeze it for review
    ///
    /// # Validation order
    /// 1. recipient and amount present, else `MissingFields`
    /// 2. amount is a number above zero, else `InvalidAmount`
    /// 3. `amount + fee <= available`, else `InsufficientBalance`
    ///
    /// A validation failure is recorded as `last_error` and leaves the state
    /// at `COMPOSING`.
    pub fn review(&self) -> Result<TransferRequest, TransferError> {
        let mut inner = self.lock();
        Self::require(&inner, Command::Review, |s| *s == TransferState::Composing)?;

        match self.validate(&inner.draft) {
            Ok(request) => {
                inner.request = Some(request.clone());
                inner.last_error = None;
                inner.state = TransferState::Reviewing;
                info!(
                    transfer_id = %request.transfer_id,
                    amount = %request.amount,
                    fee = %request.fee,
                    total = %request.total,
                    "Transfer ready for review"
                );
                Ok(request)
            }
            Err(e) => {
                warn!(code = e.code(), "Transfer review rejected: {}", e);
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Leave review and return to the form, keeping the entered fields
    pub fn edit(&self) -> Result<(), TransferError> {
        let mut inner = self.lock();
        Self::require(&inner, Command::Edit, |s| *s == TransferState::Reviewing)?;
        inner.request = None;
        inner.state = TransferState::Composing;
        debug!("Back to composing");
        Ok(())
    }

    /// Submit the reviewed transfer
    ///
    /// Moves to `SUBMITTING` and spawns the confirmation on the current Tokio
    /// runtime. When it resolves the workflow moves to `SUCCEEDED` and a
    /// `TransferCompleted` event is sent. The confirmation cannot be cancelled.
    pub fn confirm(&self) -> Result<ConfirmationHandle, TransferError> {
        let mut inner = self.lock();
        Self::require(&inner, Command::Confirm, |s| *s == TransferState::Reviewing)?;

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| TransferError::RuntimeUnavailable)?;
        let request = match inner.request.clone() {
            Some(request) => request,
            // REVIEWING always carries a frozen request
            None => {
                return Err(TransferError::InvalidTransition {
                    command: Command::Confirm,
                    state: inner.state,
                });
            }
        };

        inner.state = TransferState::Submitting;
        drop(inner);

        info!(
            transfer_id = %request.transfer_id,
            confirmer = self.confirmer.name(),
            "Transfer submitted"
        );

        let transfer_id = request.transfer_id;
        let shared = Arc::clone(&self.inner);
        let confirmer = Arc::clone(&self.confirmer);
        let events = self.events.clone();

        let task = runtime.spawn(async move {
            confirmer.confirm(&request).await;

            let event = TransferCompleted::from_request(&request);
            lock_inner(&shared).state = TransferState::Succeeded;
            info!(
                transfer_id = %event.transfer_id,
                amount = %event.amount,
                total = %event.total,
                "Transfer completed"
            );

            if events.send(event.clone()).is_err() {
                debug!(transfer_id = %event.transfer_id, "No event receiver for transfer");
            }
            event
        });

        Ok(ConfirmationHandle { transfer_id, task })
    }

    /// Dismiss a completed transfer and start a fresh one
    pub fn acknowledge(&self) -> Result<(), TransferError> {
        let mut inner = self.lock();
        Self::require(&inner, Command::Acknowledge, |s| {
            *s == TransferState::Succeeded
        })?;
        inner.clear();
        debug!("Workflow reset after completion");
        Ok(())
    }

    /// Same as [`acknowledge`](Self::acknowledge)
    pub fn reset(&self) -> Result<(), TransferError> {
        self.acknowledge()
    }

    /// Abandon the transfer before submission; emits nothing
    pub fn cancel(&self) -> Result<(), TransferError> {
        let mut inner = self.lock();
        Self::require(&inner, Command::Cancel, TransferState::is_cancellable)?;
        let from = inner.state;
        inner.clear();
        info!(from = %from, "Transfer cancelled");
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn validate(&self, draft: &TransferDraft) -> Result<TransferRequest, TransferError> {
        if draft.recipient.is_empty() || draft.amount.is_empty() {
            return Err(TransferError::MissingFields);
        }

        let amount = parse_amount(&draft.amount)?;

        let total = amount
            .checked_add(self.fee)
            .ok_or(TransferError::InsufficientBalance)?;
        if !self.balance.covers(total) {
            return Err(TransferError::InsufficientBalance);
        }

        Ok(TransferRequest::new(draft.recipient.clone(), amount, self.fee))
    }

    fn require(
        inner: &WorkflowInner,
        command: Command,
        allowed: impl Fn(&TransferState) -> bool,
    ) -> Result<(), TransferError> {
        if allowed(&inner.state) {
            Ok(())
        } else {
            warn!(command = %command, state = %inner.state, "Rejected workflow command");
            Err(TransferError::InvalidTransition {
                command,
                state: inner.state,
            })
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowInner> {
        let inner = lock_inner(&self.inner);
        debug_assert_eq!(
            inner.state.has_frozen_request(),
            inner.request.is_some(),
            "frozen request out of sync with {}",
            inner.state
        );
        inner
    }
}

// A panic while holding the lock cannot leave WorkflowInner half-updated:
// every mutation is a plain field assignment.
fn lock_inner(inner: &Mutex<WorkflowInner>) -> MutexGuard<'_, WorkflowInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn usd() -> ConversionQuote {
        ConversionQuote::new("USD", "US Dollar", d("0.0043")).unwrap()
    }

    fn workflow(available: &str) -> (TransferWorkflow, TransferEvents) {
        let balance = WalletBalance::new(d(available));
        let (wf, events) = TransferWorkflow::new(balance, d("0.001"), usd());
        let wf = wf.with_confirmer(Arc::new(SimulatedConfirmer::new(Duration::from_millis(10))));
        (wf, events)
    }

    /// Confirmer that resolves only when the test opens the gate
    struct GateConfirmer {
        gate: Notify,
        calls: AtomicUsize,
    }

    impl GateConfirmer {
        fn new() -> Self {
            Self {
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Confirmer for GateConfirmer {
        fn name(&self) -> &'static str {
            "gate"
        }

        async fn confirm(&self, _request: &TransferRequest) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
        }
    }

    fn reviewing(available: &str, amount: &str) -> (TransferWorkflow, TransferEvents) {
        let (wf, events) = workflow(available);
        wf.set_recipient("0x7F42a78904f87ad658f1Ed3099cB3E9858cb6b1c")
            .unwrap();
        wf.set_amount(amount).unwrap();
        wf.review().unwrap();
        (wf, events)
    }

    #[test]
    fn test_new_workflow_is_empty() {
        let (wf, _events) = workflow("100");
        assert_eq!(wf.state(), TransferState::Composing);
        assert!(wf.draft().is_empty());
        assert!(wf.request().is_none());
        assert!(wf.last_error().is_none());
        assert_eq!(wf.fee(), d("0.001"));
        assert_eq!(wf.balance().available, d("100"));
    }

    #[test]
    fn test_setters_store_raw_text() {
        let (wf, _events) = workflow("100");
        wf.set_recipient("0xABC").unwrap();
        wf.set_amount("not a number").unwrap();
        let draft = wf.draft();
        assert_eq!(draft.recipient, "0xABC");
        assert_eq!(draft.amount, "not a number");
        assert_eq!(wf.state(), TransferState::Composing);
    }

    #[test]
    fn test_review_missing_fields() {
        let (wf, _events) = workflow("100");
        assert_eq!(wf.review(), Err(TransferError::MissingFields));

        wf.set_recipient("0xABC").unwrap();
        assert_eq!(wf.review(), Err(TransferError::MissingFields));

        wf.set_recipient("0xABC").unwrap();
        wf.set_amount("").unwrap();
        assert_eq!(wf.review(), Err(TransferError::MissingFields));
        assert_eq!(wf.state(), TransferState::Composing);
    }

    #[test]
    fn test_review_blank_amount_is_invalid() {
        let (wf, _events) = workflow("100");
        wf.set_recipient("0xABC").unwrap();
        wf.set_amount("   ").unwrap();
        assert_eq!(wf.review(), Err(TransferError::InvalidAmount));
        assert_eq!(wf.last_error(), Some(TransferError::InvalidAmount));
        assert_eq!(wf.state(), TransferState::Composing);
    }

    #[test]
    fn test_review_amount_beyond_range() {
        let (wf, _events) = workflow("100");
        wf.set_recipient("0xABC").unwrap();
        wf.set_amount("1e30").unwrap();
        assert_eq!(wf.review(), Err(TransferError::InsufficientBalance));

        wf.set_amount("-1e30").unwrap();
        assert_eq!(wf.review(), Err(TransferError::InvalidAmount));
        assert_eq!(wf.state(), TransferState::Composing);
    }

    #[test]
    fn test_review_invalid_amount() {
        let (wf, _events) = workflow("100");
        wf.set_recipient("0xABC").unwrap();
        for amount in ["abc", "0", "-1", "NaN"] {
            wf.set_amount(amount).unwrap();
            assert_eq!(wf.review(), Err(TransferError::InvalidAmount), "{}", amount);
            assert_eq!(wf.last_error(), Some(TransferError::InvalidAmount));
        }
        assert_eq!(wf.state(), TransferState::Composing);
    }

    #[test]
    fn test_review_exact_balance_allowed() {
        let (wf, _events) = workflow("10");
        wf.set_recipient("0xABC").unwrap();
        wf.set_amount("9.999").unwrap();
        let request = wf.review().unwrap();
        assert_eq!(request.total, d("10"));
    }

    #[test]
    fn test_review_freezes_recipient_verbatim() {
        let (wf, _events) = workflow("100");
        wf.set_recipient("  0xABC  ").unwrap();
        wf.set_amount("10").unwrap();
        let request = wf.review().unwrap();
        assert_eq!(request.recipient, "  0xABC  ");
        assert_eq!(wf.request(), Some(request));
    }

    #[test]
    fn test_review_accepts_blank_recipient_text() {
        // Recipient is free text; only an empty field counts as missing
        let (wf, _events) = workflow("100");
        wf.set_recipient("   ").unwrap();
        wf.set_amount("5").unwrap();
        let request = wf.review().unwrap();
        assert_eq!(request.recipient, "   ");
        assert_eq!(wf.state(), TransferState::Reviewing);
    }

    #[test]
    fn test_setter_clears_last_error() {
        let (wf, _events) = workflow("100");
        assert!(wf.review().is_err());
        assert_eq!(wf.last_error(), Some(TransferError::MissingFields));
        wf.set_recipient("0xABC").unwrap();
        assert!(wf.last_error().is_none());
    }

    #[test]
    fn test_edit_keeps_fields() {
        let (wf, _events) = reviewing("100", "10");
        wf.edit().unwrap();
        assert_eq!(wf.state(), TransferState::Composing);
        assert!(wf.request().is_none());
        assert_eq!(wf.draft().amount, "10");

        // Reviewing again freezes a new request
        wf.set_amount("20").unwrap();
        assert_eq!(wf.review().unwrap().amount, d("20"));
    }

    #[test]
    fn test_cancel_from_reviewing_clears() {
        let (wf, mut events) = reviewing("100", "10");
        wf.cancel().unwrap();
        assert_eq!(wf.state(), TransferState::Composing);
        assert!(wf.draft().is_empty());
        assert!(wf.request().is_none());
        assert!(events.try_recv().is_none());
    }

    #[test]
    fn test_cancel_from_composing_clears() {
        let (wf, _events) = workflow("100");
        wf.set_recipient("0xABC").unwrap();
        wf.cancel().unwrap();
        assert!(wf.draft().is_empty());
    }

    #[test]
    fn test_invalid_transitions_from_composing() {
        let (wf, _events) = workflow("100");
        wf.set_recipient("0xABC").unwrap();

        for result in [wf.edit(), wf.acknowledge(), wf.reset()] {
            assert!(matches!(
                result,
                Err(TransferError::InvalidTransition {
                    state: TransferState::Composing,
                    ..
                })
            ));
        }
        assert!(matches!(
            wf.confirm(),
            Err(TransferError::InvalidTransition {
                command: Command::Confirm,
                ..
            })
        ));
        assert_eq!(wf.state(), TransferState::Composing);
        assert_eq!(wf.draft().recipient, "0xABC");
        // Contract errors are not recorded as validation errors
        assert!(wf.last_error().is_none());
    }

    #[test]
    fn test_invalid_transitions_from_reviewing() {
        let (wf, _events) = reviewing("100", "10");
        let frozen = wf.request();

        assert!(wf.set_recipient("0xDEF").is_err());
        assert!(wf.set_amount("1").is_err());
        assert!(wf.review().is_err());
        assert!(wf.acknowledge().is_err());

        assert_eq!(wf.state(), TransferState::Reviewing);
        assert_eq!(wf.request(), frozen);
        assert_eq!(wf.draft().amount, "10");
    }

    #[test]
    fn test_confirm_without_runtime() {
        let (wf, _events) = reviewing("100", "10");
        assert!(matches!(
            wf.confirm(),
            Err(TransferError::RuntimeUnavailable)
        ));
        assert_eq!(wf.state(), TransferState::Reviewing);
    }

    #[test]
    fn test_preview_follows_draft() {
        let (wf, _events) = workflow("100");
        assert!(wf.preview().total.is_none());
        wf.set_amount("10").unwrap();
        let preview = wf.preview();
        assert_eq!(preview.total_display().as_deref(), Some("10.001"));
        assert_eq!(preview.fiat_display().as_deref(), Some("0.04 USD"));
    }

    #[tokio::test]
    async fn test_confirm_happy_path() {
        let (wf, mut events) = reviewing("100", "10");
        let handle = wf.confirm().unwrap();
        assert_eq!(wf.state(), TransferState::Submitting);
        assert_eq!(Some(handle.transfer_id()), wf.request().map(|r| r.transfer_id));

        let event = handle.wait().await.unwrap();
        assert_eq!(wf.state(), TransferState::Succeeded);
        assert_eq!(event.amount, d("10"));
        assert_eq!(event.fee, d("0.001"));
        assert_eq!(event.total, d("10.001"));

        let received = events.recv().await.unwrap();
        assert_eq!(received, event);
        assert!(events.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_submitting_rejects_everything() {
        let gate = Arc::new(GateConfirmer::new());
        let (wf, mut events) = reviewing("100", "10");
        let wf = wf.with_confirmer(gate.clone());

        let handle = wf.confirm().unwrap();
        tokio::task::yield_now().await;
        let frozen = wf.request();

        assert!(wf.set_recipient("0xDEF").is_err());
        assert!(wf.set_amount("1").is_err());
        assert!(wf.review().is_err());
        assert!(wf.edit().is_err());
        assert!(wf.cancel().is_err());
        assert!(wf.acknowledge().is_err());
        assert!(wf.confirm().is_err());
        assert_eq!(wf.state(), TransferState::Submitting);
        assert_eq!(wf.request(), frozen);
        assert!(events.try_recv().is_none());

        gate.gate.notify_one();
        handle.wait().await.unwrap();
        assert_eq!(wf.state(), TransferState::Succeeded);
        assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_handle_still_completes() {
        let (wf, mut events) = reviewing("100", "10");
        drop(wf.confirm().unwrap());

        let event = events.recv().await.unwrap();
        assert_eq!(event.total, d("10.001"));
        assert_eq!(wf.state(), TransferState::Succeeded);
    }

    #[tokio::test]
    async fn test_acknowledge_starts_fresh() {
        let (wf, _events) = reviewing("100", "10");
        wf.confirm().unwrap().wait().await.unwrap();

        let frozen = wf.request();
        assert!(wf.cancel().is_err());
        assert!(wf.set_amount("1").is_err());
        assert!(matches!(
            wf.edit(),
            Err(TransferError::InvalidTransition {
                command: Command::Edit,
                state: TransferState::Succeeded
            })
        ));
        assert!(matches!(
            wf.review(),
            Err(TransferError::InvalidTransition {
                command: Command::Review,
                state: TransferState::Succeeded
            })
        ));
        assert!(matches!(
            wf.confirm(),
            Err(TransferError::InvalidTransition {
                command: Command::Confirm,
                state: TransferState::Succeeded
            })
        ));
        assert_eq!(wf.state(), TransferState::Succeeded);
        assert_eq!(wf.request(), frozen);

        wf.acknowledge().unwrap();
        assert_eq!(wf.state(), TransferState::Composing);
        assert!(wf.draft().is_empty());
        assert!(wf.request().is_none());

        // Balance snapshot is not decremented by the finished transfer
        wf.set_recipient("0xABC").unwrap();
        wf.set_amount("99").unwrap();
        assert!(wf.review().is_ok());
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = WalletConfig {
            confirm_delay_ms: 5,
            ..WalletConfig::default()
        };
        let (wf, _events) = TransferWorkflow::from_config(&config).unwrap();
        assert_eq!(wf.fee(), d("0.001"));
        assert_eq!(wf.balance().available, d("231.45"));

        wf.set_recipient("0xABC").unwrap();
        wf.set_amount("231.449").unwrap();
        assert!(wf.review().is_ok());
        wf.confirm().unwrap().wait().await.unwrap();
        assert_eq!(wf.state(), TransferState::Succeeded);
    }
}
