//! # SHADE Scanner
//!
//! Event processing loop for the stealth decryption engine.
//!
//! ## Features
//!
//! - **Channel-fed loop**: Drains any [`EventSource`] until it ends
//! - **Local filtering**: Event kind and channel tag, as a relay subscription would
//! - **Caller policies**: Stop after the first event, or after N events
//! - **Statistics**: Counts per outcome, duration, rate
//!
//! ## Example
//!
//! ```rust,ignore
//! use shade_scanner::{channel, Scanner, TracingReporter};
//!
//! let scanner = Scanner::from_engine(Arc::new(engine));
//! let (tx, mut source) = channel(256);
//! // hand `tx` to the relay client
//!
//! let summary = scanner.run(&mut source, &TracingReporter).await?;
//! println!("{} disclosed in {}ms", summary.disclosed, summary.duration_ms);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod report;
pub mod source;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use shade_core::constants::STEALTH_EVENT_KIND;
use shade_core::error::{Result, ShadeError};
use shade_core::traits::{EventSource, ReportSink};
use shade_core::types::{Disclosure, Event, EventFilter, PublicKey};
use shade_stealth::{OpenOutcome, StealthEngine};

pub use report::{CollectingReporter, TracingReporter};
pub use source::{channel, ChannelSource};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Scanner configuration.
#[derive(Clone, Debug, Default)]
pub struct ScannerConfig {
    /// Events that fail the filter are counted and skipped
    pub filter: EventFilter,
    /// Stop after the first event that reaches the engine
    pub stop_on_first: bool,
    /// Stop after this many events (filtered ones included)
    pub max_events: Option<u64>,
}

impl ScannerConfig {
    /// Creates a configuration that accepts every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stealth events only, on `channel` if given.
    pub fn stealth(channel: Option<PublicKey>) -> Self {
        let filter = match channel {
            Some(channel) => EventFilter::stealth_channel(channel),
            None => EventFilter::new().kinds(vec![STEALTH_EVENT_KIND]),
        };
        Self::new().filter(filter)
    }

    /// Sets the event filter.
    pub fn filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Enables stopping after the first event.
    pub fn stop_on_first(mut self) -> Self {
        self.stop_on_first = true;
        self
    }

    /// Limits the number of events pulled from the source.
    pub fn max_events(mut self, max: u64) -> Self {
        self.max_events = Some(max);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULTS & STATISTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of processing a single event.
#[derive(Debug)]
pub enum ScanResult {
    /// Event did not pass the filter
    Filtered,
    /// Event content was empty or not a payload
    Rejected(ShadeError),
    /// No candidate opened the payload
    NoMatch,
    /// A message was recovered
    Disclosed(Disclosure),
    /// A candidate matched but the message could not be recovered
    Unrecoverable {
        /// The candidate that passed padding
        candidate: PublicKey,
        /// Why the message could not be recovered
        error: ShadeError,
    },
}

impl ScanResult {
    /// Returns true if a message was recovered.
    pub fn is_disclosed(&self) -> bool {
        matches!(self, ScanResult::Disclosed(_))
    }

    /// Returns true if the event got as far as trial decryption.
    pub fn reached_engine(&self) -> bool {
        !matches!(self, ScanResult::Filtered | ScanResult::Rejected(_))
    }

    /// Returns the disclosure, if any.
    pub fn into_disclosure(self) -> Option<Disclosure> {
        match self {
            ScanResult::Disclosed(d) => Some(d),
            _ => None,
        }
    }
}

impl From<OpenOutcome> for ScanResult {
    fn from(outcome: OpenOutcome) -> Self {
        match outcome {
            OpenOutcome::Disclosed(d) => ScanResult::Disclosed(d),
            OpenOutcome::NoMatch => ScanResult::NoMatch,
            OpenOutcome::Unrecoverable { candidate, error } => {
                ScanResult::Unrecoverable { candidate, error }
            }
        }
    }
}

/// Statistics since the scanner was created or last reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Events pulled from the source
    pub total_events: u64,
    /// Events that failed the filter
    pub filtered: u64,
    /// Events with invalid content
    pub rejected: u64,
    /// Events no candidate opened
    pub no_match: u64,
    /// Events whose message was recovered
    pub disclosed: u64,
    /// Events matched by a candidate but not recoverable
    pub unrecoverable: u64,
    /// Time spent in `run` / `scan_all` in milliseconds
    pub duration_ms: u64,
}

impl ScanStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scan result.
    pub fn record(&mut self, result: &ScanResult) {
        self.total_events += 1;
        match result {
            ScanResult::Filtered => self.filtered += 1,
            ScanResult::Rejected(_) => self.rejected += 1,
            ScanResult::NoMatch => self.no_match += 1,
            ScanResult::Disclosed(_) => self.disclosed += 1,
            ScanResult::Unrecoverable { .. } => self.unrecoverable += 1,
        }
    }

    /// Events that reached trial decryption.
    pub fn processed(&self) -> u64 {
        self.no_match + self.disclosed + self.unrecoverable
    }

    /// Returns the scan rate (events per second).
    pub fn rate(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.total_events as f64 / self.duration_ms as f64) * 1000.0
        }
    }
}

/// Scan result summary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Events pulled from the source
    pub total_events: u64,
    /// Events that failed the filter
    pub filtered: u64,
    /// Events with invalid content
    pub rejected: u64,
    /// Events no candidate opened
    pub no_match: u64,
    /// Events whose message was recovered
    pub disclosed: u64,
    /// Events matched but not recoverable
    pub unrecoverable: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Scan rate (events per second)
    pub rate: f64,
    /// Messages recovered during this scan
    pub disclosures: Vec<Disclosure>,
}

impl ScanSummary {
    fn new(stats: ScanStats, disclosures: Vec<Disclosure>) -> Self {
        Self {
            total_events: stats.total_events,
            filtered: stats.filtered,
            rejected: stats.rejected,
            no_match: stats.no_match,
            disclosed: stats.disclosed,
            unrecoverable: stats.unrecoverable,
            duration_ms: stats.duration_ms,
            rate: stats.rate(),
            disclosures,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Processes events through a shared engine.
pub struct Scanner {
    engine: Arc<StealthEngine>,
    config: ScannerConfig,
    stats: RwLock<ScanStats>,
}

impl Scanner {
    /// Creates a scanner.
    pub fn new(engine: Arc<StealthEngine>, config: ScannerConfig) -> Self {
        Self {
            engine,
            config,
            stats: RwLock::new(ScanStats::new()),
        }
    }

    /// Creates a scanner filtering on the engine's configured channel.
    pub fn from_engine(engine: Arc<StealthEngine>) -> Self {
        let config = ScannerConfig::stealth(engine.config().channel().copied());
        Self::new(engine, config)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    /// Resets the statistics.
    pub fn reset(&self) {
        *self.stats.write() = ScanStats::new();
    }

    /// Filters, validates and opens one event.
    pub fn process_event(&self, event: &Event) -> ScanResult {
        let result = if !self.config.filter.matches(event) {
            debug!(event_id = %event.id, kind = event.kind, "event filtered");
            ScanResult::Filtered
        } else {
            match self.engine.open_event(event) {
                Ok(outcome) => outcome.into(),
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "rejected event");
                    ScanResult::Rejected(e)
                }
            }
        };

        self.stats.write().record(&result);
        result
    }

    /// Drains `source`, reporting results to `sink`.
    ///
    /// Ends when the source is exhausted or a configured stop condition is met.
    /// Malformed events are counted and skipped.
    #[instrument(skip_all)]
    pub async fn run<S, R>(&self, source: &mut S, sink: &R) -> Result<ScanSummary>
    where
        S: EventSource + ?Sized,
        R: ReportSink + ?Sized,
    {
        let start = Instant::now();
        let mut seen = 0u64;
        let mut disclosures = Vec::new();

        info!(
            stop_on_first = self.config.stop_on_first,
            max_events = ?self.config.max_events,
            "Starting scan"
        );

        loop {
            if self.limit_reached(seen) {
                info!(seen, "Event limit reached");
                break;
            }
            let Some(event) = source.next_event().await else {
                break;
            };
            seen += 1;

            let result = self.process_event(&event);
            let stop = self.config.stop_on_first && result.reached_engine();
            report(sink, &result);
            if let ScanResult::Disclosed(d) = result {
                disclosures.push(d);
            }

            if stop {
                info!("Stopping after first event");
                break;
            }
        }

        Ok(self.finish(start, disclosures))
    }

    /// Processes a batch of events without reporting.
    ///
    /// Honors the same stop conditions as [`Scanner::run`].
    pub fn scan_all(&self, events: &[Event]) -> ScanSummary {
        let start = Instant::now();
        let mut disclosures = Vec::new();

        for (seen, event) in events.iter().enumerate() {
            if self.limit_reached(seen as u64) {
                break;
            }
            let result = self.process_event(event);
            let stop = self.config.stop_on_first && result.reached_engine();
            if let ScanResult::Disclosed(d) = result {
                disclosures.push(d);
            }
            if stop {
                break;
            }
        }

        self.finish(start, disclosures)
    }

    fn limit_reached(&self, seen: u64) -> bool {
        self.config.max_events.map_or(false, |max| seen >= max)
    }

    fn finish(&self, start: Instant, disclosures: Vec<Disclosure>) -> ScanSummary {
        let mut stats = self.stats.write();
        stats.duration_ms += start.elapsed().as_millis() as u64;

        info!(
            total = stats.total_events,
            disclosed = stats.disclosed,
            duration_ms = stats.duration_ms,
            rate = format!("{:.2}/s", stats.rate()),
            "Scan complete"
        );

        ScanSummary::new(stats.clone(), disclosures)
    }
}

fn report<R: ReportSink + ?Sized>(sink: &R, result: &ScanResult) {
    match result {
        ScanResult::Disclosed(d) => sink.report(&d.candidate, &d.message),
        ScanResult::Unrecoverable { candidate, error } => sink.report_unrecoverable(candidate, error),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use shade_core::types::KeyPair;
    use shade_crypto::generate_keypair;
    use shade_stealth::{seal_direct, CandidateSet, EngineConfig};

    struct Fixture {
        receiver: KeyPair,
        sender: KeyPair,
        channel: PublicKey,
        engine: Arc<StealthEngine>,
    }

    fn fixture() -> Fixture {
        let receiver = generate_keypair();
        let sender = generate_keypair();
        let channel = generate_keypair().public;
        let config = EngineConfig::new(
            receiver.secret.clone(),
            CandidateSet::new(vec![sender.public]).unwrap(),
        )
        .unwrap()
        .with_channel(channel);
        Fixture {
            receiver,
            sender,
            channel,
            engine: Arc::new(StealthEngine::new(config)),
        }
    }

    impl Fixture {
        fn message(&self, text: &str) -> Event {
            seal_direct(&self.sender, &self.receiver.public, text)
                .unwrap()
                .to_event(generate_keypair().public, &self.channel)
        }

        fn scanner(&self, config: ScannerConfig) -> Scanner {
            Scanner::new(self.engine.clone(), config)
        }
    }

    #[tokio::test]
    async fn test_run_reports_disclosures() {
        let fx = fixture();
        let scanner = Scanner::from_engine(fx.engine.clone());
        let (tx, mut source) = channel(8);
        let reporter = CollectingReporter::new();

        tx.send(fx.message("one")).await.unwrap();
        tx.send(fx.message("two")).await.unwrap();
        drop(tx);

        let summary = scanner.run(&mut source, &reporter).await.unwrap();
        assert_eq!(summary.disclosed, 2);
        assert_eq!(summary.disclosures.len(), 2);

        let texts: Vec<_> = reporter.messages().into_iter().map(|(_, m)| m.text).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_run_with_producer_task() {
        let fx = fixture();
        let scanner = Scanner::from_engine(fx.engine.clone());
        let (tx, mut source) = channel(2);
        let events: Vec<_> = (0..5).map(|i| fx.message(&format!("msg {}", i))).collect();

        let producer = tokio::spawn(async move {
            for event in events {
                tx.send(event).await.unwrap();
            }
        });

        let summary = scanner.run(&mut source, &TracingReporter).await.unwrap();
        producer.await.unwrap();
        assert_eq!(summary.total_events, 5);
        assert_eq!(summary.disclosed, 5);
    }

    #[tokio::test]
    async fn test_filter_skips_other_channels_and_kinds() {
        let fx = fixture();
        let scanner = Scanner::from_engine(fx.engine.clone());

        let mut other_channel = fx.message("elsewhere");
        other_channel.tags = vec![vec!["p".into(), generate_keypair().public.to_hex()]];
        let mut other_kind = fx.message("note");
        other_kind.kind = 1;

        let mut source = VecDeque::from(vec![other_channel, other_kind, fx.message("here")]);
        let summary = scanner.run(&mut source, &TracingReporter).await.unwrap();

        assert_eq!(summary.filtered, 2);
        assert_eq!(summary.disclosed, 1);
        assert_eq!(summary.disclosures[0].message.text, "here");
    }

    #[tokio::test]
    async fn test_malformed_events_are_not_fatal() {
        let fx = fixture();
        let scanner = Scanner::from_engine(fx.engine.clone());

        let mut empty = fx.message("x");
        empty.content = "   ".into();
        let mut prose = fx.message("x");
        prose.content = "plain text note".into();

        let mut source = VecDeque::from(vec![empty, prose, fx.message("after")]);
        let summary = scanner.run(&mut source, &TracingReporter).await.unwrap();

        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.disclosed, 1);
    }

    #[tokio::test]
    async fn test_stop_on_first() {
        let fx = fixture();
        let scanner = fx.scanner(ScannerConfig::stealth(Some(fx.channel)).stop_on_first());

        let mut rejected = fx.message("x");
        rejected.content = String::new();
        let mut source =
            VecDeque::from(vec![rejected, fx.message("first"), fx.message("second")]);

        let reporter = CollectingReporter::new();
        let summary = scanner.run(&mut source, &reporter).await.unwrap();

        // rejected events do not count as the first event
        assert_eq!(summary.total_events, 2);
        assert_eq!(reporter.len(), 1);
        assert_eq!(reporter.messages()[0].1.text, "first");
        assert_eq!(source.len(), 1);
    }

    #[tokio::test]
    async fn test_max_events() {
        let fx = fixture();
        let scanner = fx.scanner(ScannerConfig::new().max_events(2));

        let mut source: VecDeque<_> = (0..4).map(|i| fx.message(&i.to_string())).collect();
        let summary = scanner.run(&mut source, &TracingReporter).await.unwrap();

        assert_eq!(summary.total_events, 2);
        assert_eq!(source.len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_messages_not_disclosed() {
        let fx = fixture();
        let scanner = Scanner::from_engine(fx.engine.clone());

        // same sender, different recipient
        let stranger = generate_keypair();
        let foreign = seal_direct(&fx.sender, &stranger.public, "not for you")
            .unwrap()
            .to_event(generate_keypair().public, &fx.channel);

        let mut source = VecDeque::from(vec![foreign, fx.message("for you")]);
        let reporter = CollectingReporter::new();
        let summary = scanner.run(&mut source, &reporter).await.unwrap();

        assert_eq!(summary.disclosed, 1);
        assert_eq!(summary.no_match + summary.unrecoverable, 1);
        assert_eq!(reporter.messages()[0].1.text, "for you");
    }

    #[test]
    fn test_scan_all_and_stats() {
        let fx = fixture();
        let scanner = Scanner::from_engine(fx.engine.clone());

        let mut other_kind = fx.message("x");
        other_kind.kind = 7;
        let events = vec![fx.message("a"), other_kind, fx.message("b")];

        let summary = scanner.scan_all(&events);
        assert_eq!(summary.disclosed, 2);
        assert_eq!(summary.filtered, 1);

        let stats = scanner.stats();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.processed(), 2);

        scanner.reset();
        assert_eq!(scanner.stats(), ScanStats::new());
    }

    #[test]
    fn test_scan_all_stop_on_first() {
        let fx = fixture();
        let scanner = fx.scanner(ScannerConfig::new().stop_on_first());

        let summary = scanner.scan_all(&[fx.message("a"), fx.message("b")]);
        assert_eq!(summary.total_events, 1);
        assert_eq!(summary.disclosures[0].message.text, "a");
    }

    #[test]
    fn test_stats_rate() {
        let stats = ScanStats {
            total_events: 500,
            duration_ms: 1000,
            ..ScanStats::default()
        };
        assert!((stats.rate() - 500.0).abs() < 0.01);
        assert_eq!(ScanStats::new().rate(), 0.0);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = ScanSummary::new(ScanStats::new(), Vec::new());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"disclosed\":0"));
    }

    #[test]
    fn test_run_outside_tokio_runtime() {
        let fx = fixture();
        let scanner = Scanner::from_engine(fx.engine.clone());
        let result = tokio_test::block_on(async {
            let mut source = VecDeque::from(vec![fx.message("sync")]);
            scanner.run(&mut source, &TracingReporter).await
        })
        .unwrap();
        assert_eq!(result.disclosed, 1);
    }
}
