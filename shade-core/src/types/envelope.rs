//! Stealth envelope: the decrypted outer layer.
//!
//! After the outer layer opens, its plaintext must be a JSON object naming
//! the true author and carrying the inner payload:
//!
//! ```text
//! {"pubkey": "<hex x-only key>", "content": "<base64>?iv=<base64>"}
//! ```
//!
//! Parsing is the second filter after the CBC padding check: garbage that
//! happened to pass padding is rejected here as a structural mismatch.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShadeError};
use crate::types::{EncryptedPayload, PublicKey};

/// Outer-layer plaintext of a stealth message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealthEnvelope {
    /// Identity of the inner layer's author
    pub pubkey: PublicKey,
    /// Inner payload, encrypted with the standard messaging cipher
    pub content: EncryptedPayload,
}

impl StealthEnvelope {
    /// Creates a new envelope.
    pub fn new(pubkey: PublicKey, content: EncryptedPayload) -> Self {
        Self { pubkey, content }
    }

    /// Parses an envelope from decrypted outer-layer bytes.
    ///
    /// # Errors
    /// `StructuralMismatch` if the bytes are not UTF-8, not JSON, or lack a
    /// valid `pubkey` or `content`.
    pub fn from_plaintext(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ShadeError::StructuralMismatch(format!("not UTF-8: {}", e)))?;
        serde_json::from_str(text).map_err(|e| ShadeError::StructuralMismatch(e.to_string()))
    }

    /// Serializes to the JSON form that gets encrypted as the outer layer.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
