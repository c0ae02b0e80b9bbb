//! # SHADE Stealth Messaging
//!
//! Receiver and sender operations for two-layer stealth messages.
//!
//! This crate provides:
//!
//! - **Oracle**: Trial decryption of a payload against an ordered candidate set
//! - **Unwrap**: Envelope parsing and inner-layer decryption
//! - **Seal**: Sender-side construction of stealth payloads
//! - **Engine**: Oracle + unwrap behind an immutable configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shade_stealth::{seal_direct, CandidateSet, EngineConfig, StealthEngine};
//!
//! // Sender: seal a message to the receiver
//! let sealed = seal_direct(&sender, &receiver.public, "hello")?;
//! // Publish sealed.payload() as event content
//!
//! // Receiver: configure candidates and open
//! let config = EngineConfig::new(receiver.secret.clone(), CandidateSet::new(vec![sender.public])?)?;
//! let engine = StealthEngine::new(config);
//! if let Some(disclosure) = engine.open_payload(sealed.payload()).into_disclosure() {
//!     println!("{}: {}", disclosure.message.sender, disclosure.message.text);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod engine;
pub mod oracle;
pub mod seal;
pub mod unwrap;

pub use config::EngineConfig;
pub use engine::{OpenOutcome, StealthEngine};
pub use oracle::{find_all_senders, find_sender, CandidateSet, StealthMatch, TrialOutcome};
pub use seal::{seal, seal_direct, SealedMessage};
pub use unwrap::{open_envelope, unwrap};
