//! Event sources backed by a tokio channel.
//!
//! The pub/sub client owns the sending half and pushes authenticated events;
//! the scanner drains the receiving half. Dropping every sender ends the scan.

use async_trait::async_trait;
use tokio::sync::mpsc;

use shade_core::traits::EventSource;
use shade_core::types::Event;

/// Receiving half of an event channel.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Event>,
}

impl ChannelSource {
    /// Wraps an existing receiver.
    pub fn new(rx: mpsc::Receiver<Event>) -> Self {
        Self { rx }
    }

    /// Stops accepting new events; buffered events are still delivered.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl From<mpsc::Receiver<Event>> for ChannelSource {
    fn from(rx: mpsc::Receiver<Event>) -> Self {
        Self::new(rx)
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (mpsc::Sender<Event>, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelSource::new(rx))
}
