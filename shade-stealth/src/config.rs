//! Engine configuration.
//!
//! Loaded once at startup and never mutated afterwards. The receiver secret
//! lives here and nowhere else.
//!
//! | Variable  | Meaning                                  |
//! |-----------|------------------------------------------|
//! | `RPRIV`   | receiver secret key, hex                 |
//! | `SPUB`    | candidate senders, comma-separated hex   |
//! | `CHANPUB` | channel public key to filter on (optional) |

use shade_core::constants::{ENV_CANDIDATES, ENV_CHANNEL, ENV_RECEIVER_SECRET};
use shade_core::error::{Result, ShadeError};
use shade_core::types::{KeyPair, PublicKey, SecretKey};
use shade_crypto::keypair_from_secret;

use crate::oracle::CandidateSet;

/// Immutable configuration for a [`crate::StealthEngine`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
    receiver: KeyPair,
    candidates: CandidateSet,
    channel: Option<PublicKey>,
}

impl EngineConfig {
    /// Creates a configuration, deriving the receiver's public key.
    ///
    /// # Errors
    /// `ConfigError` if the receiver secret is not a valid scalar.
    pub fn new(receiver_secret: SecretKey, candidates: CandidateSet) -> Result<Self> {
        let receiver = keypair_from_secret(&receiver_secret)
            .map_err(|e| ShadeError::ConfigError(format!("{}: {}", ENV_RECEIVER_SECRET, e)))?;
        Ok(Self {
            receiver,
            candidates,
            channel: None,
        })
    }

    /// Sets the channel events must be tagged with.
    pub fn with_channel(mut self, channel: PublicKey) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Loads from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads from an arbitrary key/value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ShadeError::ConfigError(format!("{} is not set", key)))
        };

        let secret = SecretKey::from_hex(&required(ENV_RECEIVER_SECRET)?)
            .map_err(|e| ShadeError::ConfigError(format!("{}: {}", ENV_RECEIVER_SECRET, e)))?;
        let candidates = CandidateSet::parse_list(&required(ENV_CANDIDATES)?)?;

        let mut config = Self::new(secret, candidates)?;
        if let Some(channel) = lookup(ENV_CHANNEL).filter(|v| !v.trim().is_empty()) {
            let channel = PublicKey::from_hex(&channel)
                .map_err(|e| ShadeError::ConfigError(format!("{}: {}", ENV_CHANNEL, e)))?;
            config = config.with_channel(channel);
        }
        Ok(config)
    }

    /// The receiver's secret key.
    pub fn receiver_secret(&self) -> &SecretKey {
        &self.receiver.secret
    }

    /// The receiver's public identity.
    pub fn receiver_public(&self) -> &PublicKey {
        &self.receiver.public
    }

    /// Candidate senders in scan order.
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// Channel filter, if configured.
    pub fn channel(&self) -> Option<&PublicKey> {
        self.channel.as_ref()
    }
}
