//! Completion callbacks of a copy run

use super::engine::RecordCopy;
use super::error::{CopyError, SkippedStep};
use crate::crm::CrmRecord;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// Receives the outcome of a copy. Exactly one of `record_copy_did_finish`
/// and `record_copy_did_fail` is called per run.
pub trait RecordCopyDelegate: Send + Sync {
    fn record_copy_did_finish(&self, copy: &RecordCopy, records: Vec<CrmRecord>);

    fn record_copy_did_fail(&self, copy: &RecordCopy, error: CopyError);

    /// Called for every step dropped for lack of configuration
    fn record_copy_did_skip_step(&self, _copy: &RecordCopy, _skipped: &SkippedStep) {}
}

type Outcome = Result<Vec<CrmRecord>, CopyError>;

/// Delegate forwarding everything into channels for async callers
pub struct ChannelDelegate {
    outcome: Mutex<Option<oneshot::Sender<Outcome>>>,
    skipped: mpsc::UnboundedSender<SkippedStep>,
}

impl ChannelDelegate {
    pub fn new() -> (Arc<Self>, CopyReceiver) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (skipped_tx, skipped_rx) = mpsc::unbounded_channel();

        let delegate = Arc::new(Self {
            outcome: Mutex::new(Some(outcome_tx)),
            skipped: skipped_tx,
        });
        let receiver = CopyReceiver {
            outcome: outcome_rx,
            skipped: skipped_rx,
        };

        (delegate, receiver)
    }

    fn deliver(&self, outcome: Outcome) {
        let sender = match self.outcome.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(sender) => {
                if sender.send(outcome).is_err() {
                    log::debug!("Copy outcome receiver dropped before completion");
                }
            }
            None => log::warn!("Copy outcome delivered more than once"),
        }
    }
}

impl RecordCopyDelegate for ChannelDelegate {
    fn record_copy_did_finish(&self, _copy: &RecordCopy, records: Vec<CrmRecord>) {
        self.deliver(Ok(records));
    }

    fn record_copy_did_fail(&self, _copy: &RecordCopy, error: CopyError) {
        self.deliver(Err(error));
    }

    fn record_copy_did_skip_step(&self, _copy: &RecordCopy, skipped: &SkippedStep) {
        let _ = self.skipped.send(skipped.clone());
    }
}

/// Final report of a run observed through a `ChannelDelegate`
#[derive(Debug)]
pub struct CopyReport {
    pub result: Outcome,
    pub skipped: Vec<SkippedStep>,
}

pub struct CopyReceiver {
    outcome: oneshot::Receiver<Outcome>,
    skipped: mpsc::UnboundedReceiver<SkippedStep>,
}

impl CopyReceiver {
    /// Waits for the run to end
    pub async fn wait(mut self) -> CopyReport {
        let result = match self.outcome.await {
            Ok(outcome) => outcome,
            Err(_) => Err(CopyError::Aborted),
        };

        let mut skipped = Vec::new();
        while let Ok(step) = self.skipped.try_recv() {
            skipped.push(step);
        }

        CopyReport { result, skipped }
    }
}
