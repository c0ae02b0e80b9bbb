//! Encrypted direct messages as the event network defines them (NIP-04).
//!
//! The conversation key is the raw X-coordinate of the ECDH point, taken
//! from the curve library's agreement primitive. It equals the stealth-layer
//! secret from [`crate::ecdh`] for the same key pair, but the inner layer
//! always derives it through this module so that it follows the network's
//! convention independently of the outer layer.

use k256::ecdh::diffie_hellman;
use tracing::trace;

use shade_core::error::{Result, ShadeError};
use shade_core::types::{EncryptedPayload, PublicKey, SecretKey, SharedSecret};

use crate::cbc::{self, Decryption};
use crate::keys::{lift_x, to_k256_secret};

/// Derives the conversation key between two identities.
///
/// # Errors
/// `InvalidKeyMaterial` for an invalid scalar or point.
pub fn conversation_key(local: &SecretKey, remote: &PublicKey) -> Result<SharedSecret> {
    let scalar = to_k256_secret(local)?;
    let point = lift_x(remote)?;

    let shared = diffie_hellman(scalar.to_nonzero_scalar(), point.as_affine());
    SharedSecret::from_bytes(shared.raw_secret_bytes().as_slice())
}

/// Encrypts `text` from `sender` to `recipient`.
pub fn encrypt(sender: &SecretKey, recipient: &PublicKey, text: &str) -> Result<EncryptedPayload> {
    let key = conversation_key(sender, recipient)?;
    Ok(cbc::encrypt(&key, text.as_bytes()))
}

/// Decrypts a direct message from `sender`.
///
/// # Errors
/// - `InvalidKeyMaterial` for an invalid scalar or point
/// - `DecryptionFailure` if the padding check fails or the plaintext is not UTF-8
pub fn decrypt(receiver: &SecretKey, sender: &PublicKey, payload: &EncryptedPayload) -> Result<String> {
    let key = conversation_key(receiver, sender)?;

    match cbc::decrypt(&key, payload) {
        Decryption::Plaintext(bytes) => String::from_utf8(bytes).map_err(|_| {
            trace!(sender = %sender.short(), "direct message is not utf-8");
            ShadeError::DecryptionFailure
        }),
        Decryption::PaddingRejected => Err(ShadeError::DecryptionFailure),
    }
}
