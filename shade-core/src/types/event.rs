//! Inbound event records and subscription filters.
//!
//! Events arrive from the pub/sub client already authenticated (id and
//! signature checked). The engine only reads `content`; `kind` and `tags`
//! drive local filtering and `id` is carried into reports.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{PUBKEY_TAG, STEALTH_EVENT_KIND};
use crate::error::{Result, ShadeError};
use crate::types::{EncryptedPayload, PublicKey};

/// An event record in the network's JSON form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID (hex hash, opaque here)
    #[serde(default)]
    pub id: String,
    /// Publishing identity (not the stealth sender)
    pub pubkey: PublicKey,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub created_at: u64,
    /// Event kind
    pub kind: u32,
    /// Tags, each a list of strings (`["p", "<hex>"]`, ...)
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    /// Event content (the outer encrypted payload for stealth events)
    pub content: String,
    /// Signature (opaque here)
    #[serde(default)]
    pub sig: String,
}

impl Event {
    /// Creates an unsigned stealth event tagged with a channel.
    ///
    /// Signing and publishing are left to the pub/sub client.
    pub fn stealth(pubkey: PublicKey, channel: &PublicKey, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            pubkey,
            created_at: Utc::now().timestamp().max(0) as u64,
            kind: STEALTH_EVENT_KIND,
            tags: vec![vec![PUBKEY_TAG.to_string(), channel.to_hex()]],
            content: content.into(),
            sig: String::new(),
        }
    }

    /// Validates that the content is a non-empty string.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(ShadeError::InvalidEvent("empty content".into()));
        }
        Ok(())
    }

    /// Validates the event and parses its content as an encrypted payload.
    pub fn payload(&self) -> Result<EncryptedPayload> {
        self.validate()?;
        EncryptedPayload::parse(self.content.trim())
    }

    /// Returns the values of all `p` tags that parse as public keys.
    pub fn pubkey_tags(&self) -> impl Iterator<Item = PublicKey> + '_ {
        self.tags
            .iter()
            .filter(|tag| tag.first().map(String::as_str) == Some(PUBKEY_TAG))
            .filter_map(|tag| tag.get(1))
            .filter_map(|value| PublicKey::from_hex(value).ok())
    }

    /// Returns the creation time, if representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(i64::try_from(self.created_at).ok()?, 0).single()
    }

    /// Parses an event from a JSON string.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Local subscription filter.
///
/// Mirrors the relay filter `{"kinds": [...], "#p": [...]}`: an event passes
/// when its kind is listed (if kinds are given) and it carries at least one
/// listed `p` tag (if tags are given).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Allowed event kinds (None = any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u32>>,
    /// Required `p` tag values (None = any)
    #[serde(default, rename = "#p", skip_serializing_if = "Option::is_none")]
    pub pubkey_tags: Option<Vec<PublicKey>>,
}

impl EventFilter {
    /// Creates a filter that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for stealth events on a channel.
    pub fn stealth_channel(channel: PublicKey) -> Self {
        Self::new().kinds(vec![STEALTH_EVENT_KIND]).channel(channel)
    }

    /// Restricts kinds.
    pub fn kinds(mut self, kinds: Vec<u32>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    /// Adds a required channel tag.
    pub fn channel(mut self, channel: PublicKey) -> Self {
        self.pubkey_tags.get_or_insert_with(Vec::new).push(channel);
        self
    }

    /// Returns true if the event passes the filter.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        if let Some(tags) = &self.pubkey_tags {
            if !event.pubkey_tags().any(|p| tags.contains(&p)) {
                return false;
            }
        }
        true
    }
}
