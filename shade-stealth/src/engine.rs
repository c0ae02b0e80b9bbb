//! Stealth decryption engine.
//!
//! Combines the trial decryption oracle with the layered unwrap:
//!
//! ```text
//! payload ──► find_sender ──► NoMatch
//!                  │
//!                  ▼ Match(candidate)
//!               unwrap ──► Err ──► Unrecoverable { candidate, error }
//!                  │
//!                  ▼
//!             Disclosed(Disclosure)
//! ```
//!
//! The first padding match is final. If its plaintext turns out not to be an
//! envelope, later candidates are not retried.

use tracing::{debug, info, instrument, warn};

use shade_core::error::{Result, ShadeError};
use shade_core::types::{Disclosure, EncryptedPayload, Event, PublicKey};

use crate::config::EngineConfig;
use crate::oracle::{find_sender, TrialOutcome};
use crate::unwrap::unwrap;

/// Result of opening one payload.
#[derive(Debug)]
pub enum OpenOutcome {
    /// A candidate opened the payload and the message was recovered
    Disclosed(Disclosure),
    /// No candidate opened the payload
    NoMatch,
    /// A candidate passed padding but the message could not be recovered
    Unrecoverable {
        /// The candidate that passed padding
        candidate: PublicKey,
        /// `StructuralMismatch` or `UnwrapFailure`
        error: ShadeError,
    },
}

impl OpenOutcome {
    /// Returns true if a message was recovered.
    pub fn is_disclosed(&self) -> bool {
        matches!(self, OpenOutcome::Disclosed(_))
    }

    /// Returns the disclosure, if any.
    pub fn into_disclosure(self) -> Option<Disclosure> {
        match self {
            OpenOutcome::Disclosed(d) => Some(d),
            _ => None,
        }
    }
}

/// Receiver-side engine. Immutable once built; share it with `Arc`.
#[derive(Clone, Debug)]
pub struct StealthEngine {
    config: EngineConfig,
}

impl StealthEngine {
    /// Creates an engine from its configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Opens a bare payload.
    #[instrument(skip_all, fields(ct_len = payload.ciphertext().len()))]
    pub fn open_payload(&self, payload: &EncryptedPayload) -> OpenOutcome {
        self.open(payload, None)
    }

    /// Validates an event and opens its content.
    ///
    /// # Errors
    /// - `InvalidEvent` if the content is empty or whitespace
    /// - `MalformedPayload` if the content is not a payload string
    #[instrument(skip_all, fields(event_id = %event.id))]
    pub fn open_event(&self, event: &Event) -> Result<OpenOutcome> {
        let payload = event.payload()?;
        let event_id = Some(event.id.clone()).filter(|id| !id.is_empty());
        Ok(self.open(&payload, event_id))
    }

    fn open(&self, payload: &EncryptedPayload, event_id: Option<String>) -> OpenOutcome {
        let config = &self.config;

        let found = match find_sender(config.receiver_secret(), config.candidates(), payload) {
            TrialOutcome::Match(found) => found,
            TrialOutcome::NoMatch => {
                debug!(candidates = config.candidates().len(), "no candidate matched");
                return OpenOutcome::NoMatch;
            }
        };

        match unwrap(&found.plaintext, config.receiver_secret()) {
            Ok(message) => {
                info!(
                    candidate = %found.candidate.short(),
                    position = found.position,
                    sender = %message.sender.short(),
                    "message disclosed"
                );
                OpenOutcome::Disclosed(Disclosure {
                    event_id,
                    candidate: found.candidate,
                    position: found.position,
                    message,
                })
            }
            Err(error) => {
                warn!(
                    candidate = %found.candidate.short(),
                    position = found.position,
                    %error,
                    "candidate matched but message is unrecoverable"
                );
                OpenOutcome::Unrecoverable {
                    candidate: found.candidate,
                    error,
                }
            }
        }
    }
}
