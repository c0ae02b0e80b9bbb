//! Stealth message creation (sender side).
//!
//! Sealing is the inverse of the engine:
//!
//! ```text
//! inner    = nip04(author → recipient, text)
//! envelope = {"pubkey": author, "content": inner}
//! outer    = cbc(derive(outer_secret, recipient), envelope)
//! ```
//!
//! The outer identity is usually the author itself. It may also be a
//! separate identity the recipient lists as a candidate, in which case the
//! candidate that matches differs from the author that is disclosed.

use tracing::instrument;

use shade_core::error::Result;
use shade_core::types::{EncryptedPayload, Event, KeyPair, PublicKey, SecretKey, StealthEnvelope};
use shade_crypto::{cbc, derive_shared_secret, nip04, public_key_from_secret};

/// A sealed stealth message ready to be published.
#[derive(Clone, Debug)]
pub struct SealedMessage {
    payload: EncryptedPayload,
    envelope: StealthEnvelope,
    outer: PublicKey,
}

impl SealedMessage {
    /// The outer payload (event content).
    pub fn payload(&self) -> &EncryptedPayload {
        &self.payload
    }

    /// The envelope that was encrypted as the outer layer.
    pub fn envelope(&self) -> &StealthEnvelope {
        &self.envelope
    }

    /// Identity the recipient must list as a candidate.
    pub fn outer(&self) -> &PublicKey {
        &self.outer
    }

    /// Wraps the payload in an unsigned stealth event on `channel`.
    ///
    /// `publisher` appears in the clear; use an identity that does not link
    /// to the author.
    pub fn to_event(&self, publisher: PublicKey, channel: &PublicKey) -> Event {
        Event::stealth(publisher, channel, self.payload.encode())
    }
}

/// Seals `text` from `author` to `recipient`, with the outer layer keyed by `outer`.
///
/// # Errors
/// `InvalidKeyMaterial` if any key is not valid on the curve.
#[instrument(skip_all, fields(author = %author.public.short(), recipient = %recipient.short()))]
pub fn seal(
    author: &KeyPair,
    outer: &SecretKey,
    recipient: &PublicKey,
    text: &str,
) -> Result<SealedMessage> {
    let inner = nip04::encrypt(&author.secret, recipient, text)?;
    let envelope = StealthEnvelope::new(author.public, inner);

    let outer_public = public_key_from_secret(outer)?;
    let key = derive_shared_secret(outer, recipient)?;
    let payload = cbc::encrypt(&key, envelope.to_json()?.as_bytes());

    Ok(SealedMessage {
        payload,
        envelope,
        outer: outer_public,
    })
}

/// Seals with the author's own key on both layers.
pub fn seal_direct(author: &KeyPair, recipient: &PublicKey, text: &str) -> Result<SealedMessage> {
    seal(author, &author.secret, recipient, text)
}
