//! Collaborator interfaces for SHADE.
//!
//! The engine neither subscribes to relays nor renders output. Events come in
//! through an [`EventSource`] and results go out through a [`ReportSink`].

use async_trait::async_trait;

use crate::error::ShadeError;
use crate::types::{Event, PlaintextMessage, PublicKey};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Delivers already-authenticated events to the processing loop.
///
/// Implementations might wrap:
/// - An in-process channel fed by a relay client
/// - A file of recorded events
/// - A fixed list (for tests)
#[async_trait]
pub trait EventSource: Send {
    /// Waits for the next event. `None` means the stream has ended.
    async fn next_event(&mut self) -> Option<Event>;
}

#[async_trait]
impl EventSource for std::collections::VecDeque<Event> {
    async fn next_event(&mut self) -> Option<Event> {
        self.pop_front()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// Receives the results of successful unwraps.
///
/// This is the only place the engine has observable side effects.
pub trait ReportSink: Send + Sync {
    /// Reports a recovered message and the candidate whose key opened it.
    fn report(&self, candidate: &PublicKey, message: &PlaintextMessage);

    /// Reports a candidate that matched the outer layer but whose message
    /// could not be recovered.
    fn report_unrecoverable(&self, _candidate: &PublicKey, _error: &ShadeError) {}
}

impl<T: ReportSink + ?Sized> ReportSink for std::sync::Arc<T> {
    fn report(&self, candidate: &PublicKey, message: &PlaintextMessage) {
        (**self).report(candidate, message)
    }

    fn report_unrecoverable(&self, candidate: &PublicKey, error: &ShadeError) {
        (**self).report_unrecoverable(candidate, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct Recorder(Mutex<Vec<String>>);

    impl ReportSink for Recorder {
        fn report(&self, _candidate: &PublicKey, message: &PlaintextMessage) {
            self.0.lock().unwrap().push(message.text.clone());
        }
    }

    #[test]
    fn test_arc_sink_forwards() {
        let sink = Arc::new(Recorder(Mutex::new(Vec::new())));
        let pk = PublicKey::from_array([1; 32]);
        let shared: Arc<Recorder> = Arc::clone(&sink);
        shared.report(&pk, &PlaintextMessage::new(pk, "hello"));
        shared.report_unrecoverable(&pk, &ShadeError::DecryptionFailure);
        assert_eq!(sink.0.lock().unwrap().as_slice(), ["hello".to_string()]);
    }

    #[test]
    fn test_vecdeque_source_drains_in_order() {
        let pk = PublicKey::from_array([1; 32]);
        let mut source: VecDeque<Event> = (0..3)
            .map(|i| {
                let mut e = Event::stealth(pk, &pk, "x?iv=y");
                e.id = i.to_string();
                e
            })
            .collect();

        let mut ids = Vec::new();
        while let Some(event) = tokio_test::block_on(source.next_event()) {
            ids.push(event.id);
        }
        assert_eq!(ids, vec!["0", "1", "2"]);
    }
}
