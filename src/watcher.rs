//! Confirmation watcher
//!
//! A polling state machine with three states: `Waiting`, `Confirmed`,
//! `Aborted`. One instance runs per active checkout, keyed only by the
//! reference key; it has no link back to the composer's output, because
//! submission is external and asynchronous.
//!
//! Each tick issues a fresh, idempotent query for confirmed signatures
//! touching the reference. The policy deliberately treats "no signature yet"
//! and "query failed" identically at the retry level — both keep waiting —
//! but logs them differently: the former is the benign steady state
//! (trace), the latter a transient poll failure (debug). The loop terminates
//! exactly once, either on the first confirmed signature or on external
//! cancellation; an internal error never ends it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use solana_sdk::pubkey::Pubkey;

use crate::ledger::{FinalityLevel, LedgerRpc};

/// Terminal settlement observation for a reference key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationResult {
    pub reference: Pubkey,
    pub signature: String,
    pub finality: FinalityLevel,
}

/// Watcher state as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchStatus {
    /// No settlement observed yet; the expected steady state
    Waiting,
    /// Settlement observed at confirmed finality; polling has stopped
    Confirmed(ConfirmationResult),
    /// Externally cancelled before any settlement was observed
    Aborted,
}

impl WatchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WatchStatus::Waiting)
    }
}

/// Polls the ledger for a transaction bearing a reference key
pub struct ConfirmationWatcher {
    rpc: Arc<dyn LedgerRpc>,
    poll_interval: Duration,
}

impl ConfirmationWatcher {
    pub fn new(rpc: Arc<dyn LedgerRpc>, poll_interval: Duration) -> Self {
        Self { rpc, poll_interval }
    }

    /// Run the polling loop until confirmation or cancellation.
    ///
    /// Returns the terminal state. `cancel` aborts the watch when fired; a
    /// dropped sender counts as cancellation too, so tearing down the owning
    /// handle releases the repeating task deterministically.
    pub async fn run(
        &self,
        reference: Pubkey,
        mut cancel: oneshot::Receiver<()>,
    ) -> WatchStatus {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut cancel => {
                    info!(reference = %reference, "watch cancelled");
                    return WatchStatus::Aborted;
                }
                _ = ticker.tick() => {
                    match self.rpc.signatures_for_reference(&reference).await {
                        Ok(records) => {
                            if let Some(record) =
                                records.into_iter().find(|r| r.succeeded())
                            {
                                let result = ConfirmationResult {
                                    reference,
                                    signature: record.signature,
                                    finality: record.finality,
                                };
                                info!(
                                    reference = %reference,
                                    signature = %result.signature,
                                    finality = %result.finality,
                                    "settlement confirmed"
                                );
                                return WatchStatus::Confirmed(result);
                            }
                            // benign: not yet settled, keep waiting silently
                            trace!(reference = %reference, "no settlement yet");
                        }
                        Err(e) => {
                            // transient; never terminates the loop
                            debug!(reference = %reference, error = %e, "transient poll failure");
                        }
                    }
                }
            }
        }
    }

    /// Spawn the watch as an independent cancellable task.
    pub fn spawn(self, reference: Pubkey) -> WatcherHandle {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (status_tx, status_rx) = watch::channel(WatchStatus::Waiting);
        let task = tokio::spawn(async move {
            let terminal = self.run(reference, cancel_rx).await;
            let _ = status_tx.send(terminal.clone());
            terminal
        });
        WatcherHandle {
            cancel: Some(cancel_tx),
            status: status_rx,
            task,
        }
    }
}

/// Handle to a spawned watcher task.
///
/// Dropping the handle cancels the watch: the oneshot sender is dropped,
/// which the polling loop observes as cancellation, so no orphaned timer
/// outlives its owner.
pub struct WatcherHandle {
    cancel: Option<oneshot::Sender<()>>,
    status: watch::Receiver<WatchStatus>,
    task: JoinHandle<WatchStatus>,
}

impl WatcherHandle {
    /// Status stream for the owning view; starts at `Waiting` and changes
    /// exactly once, to a terminal state.
    pub fn status(&self) -> watch::Receiver<WatchStatus> {
        self.status.clone()
    }

    /// Cancel the watch. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Wait for the terminal state.
    pub async fn join(self) -> WatchStatus {
        self.task.await.unwrap_or(WatchStatus::Aborted)
    }
}
