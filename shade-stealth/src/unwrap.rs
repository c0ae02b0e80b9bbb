//! Layered unwrap: from outer plaintext to the author's message.
//!
//! The outer plaintext names the inner author and carries the inner payload.
//! The inner key is derived independently (network direct-message
//! convention) between the receiver and that author, so an envelope can only
//! be opened if its `pubkey` really wrote `content`.

use tracing::debug;

use shade_core::error::{Result, ShadeError};
use shade_core::types::{PlaintextMessage, SecretKey, StealthEnvelope};
use shade_crypto::nip04;

/// Parses outer-layer bytes as an envelope and decrypts its inner payload.
///
/// # Errors
/// - `StructuralMismatch` if the bytes are not a stealth envelope (typically
///   a padding false positive in the oracle)
/// - `UnwrapFailure` if the inner payload does not open under the named author
pub fn unwrap(outer_plaintext: &[u8], receiver: &SecretKey) -> Result<PlaintextMessage> {
    let envelope = StealthEnvelope::from_plaintext(outer_plaintext)?;
    open_envelope(&envelope, receiver)
}

/// Decrypts the inner payload of an already-parsed envelope.
pub fn open_envelope(envelope: &StealthEnvelope, receiver: &SecretKey) -> Result<PlaintextMessage> {
    let author = envelope.pubkey;

    match nip04::decrypt(receiver, &author, &envelope.content) {
        Ok(text) => Ok(PlaintextMessage::new(author, text)),
        Err(ShadeError::DecryptionFailure) => {
            debug!(author = %author.short(), "inner payload rejected");
            Err(ShadeError::UnwrapFailure(format!(
                "inner payload does not open under {}",
                author.short()
            )))
        }
        Err(ShadeError::InvalidKeyMaterial(reason)) => Err(ShadeError::UnwrapFailure(format!(
            "envelope key unusable: {}",
            reason
        ))),
        Err(e) => Err(e),
    }
}
