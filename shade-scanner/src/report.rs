//! Report sinks.

use parking_lot::Mutex;
use tracing::{info, warn};

use shade_core::error::ShadeError;
use shade_core::traits::ReportSink;
use shade_core::types::{PlaintextMessage, PublicKey};

/// Emits one structured log line per result.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ReportSink for TracingReporter {
    fn report(&self, candidate: &PublicKey, message: &PlaintextMessage) {
        info!(
            candidate = %candidate,
            sender = %message.sender,
            text = %message.text,
            "stealth message"
        );
    }

    fn report_unrecoverable(&self, candidate: &PublicKey, error: &ShadeError) {
        warn!(candidate = %candidate, %error, "unrecoverable stealth message");
    }
}

/// Keeps every result in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<(PublicKey, PlaintextMessage)>>,
    unrecoverable: Mutex<Vec<(PublicKey, String)>>,
}

impl CollectingReporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reported messages with the candidate that opened them.
    pub fn messages(&self) -> Vec<(PublicKey, PlaintextMessage)> {
        self.messages.lock().clone()
    }

    /// Unrecoverable matches with the error text.
    pub fn unrecoverable(&self) -> Vec<(PublicKey, String)> {
        self.unrecoverable.lock().clone()
    }

    /// Number of reported messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl ReportSink for CollectingReporter {
    fn report(&self, candidate: &PublicKey, message: &PlaintextMessage) {
        self.messages.lock().push((*candidate, message.clone()));
    }

    fn report_unrecoverable(&self, candidate: &PublicKey, error: &ShadeError) {
        self.unrecoverable.lock().push((*candidate, error.to_string()));
    }
}
