//! Error types for SHADE.
//!
//! One error enum covers the whole decryption pipeline. Several variants are
//! expected control-flow signals rather than faults: a wrong candidate key
//! produces `DecryptionFailure` far more often than anything else, and the
//! oracle treats it as "try the next one".

use thiserror::Error;

/// Result type alias using `ShadeError`.
pub type Result<T> = std::result::Result<T, ShadeError>;

/// Main error type for all SHADE operations.
#[derive(Debug, Error)]
pub enum ShadeError {
    // ═══════════════════════════════════════════════════════════════════════════
    // KEY MATERIAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Secret scalar or public point is not valid for the curve.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Key has the wrong length.
    #[error("Invalid key: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Required length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // DECRYPTION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Payload string is not `<base64>?iv=<base64>` or an IV has the wrong size.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Padding check failed: the key does not belong to this payload.
    #[error("Decryption failed")]
    DecryptionFailure,

    /// Outer layer decrypted but is not a stealth envelope.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// Envelope parsed but its inner payload does not open under the asserted identity.
    #[error("Unwrap failed: {0}")]
    UnwrapFailure(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Inbound event record failed validation.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error (missing key material, empty candidate set, ...).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ShadeError {
    /// Returns true if this is a cryptographic error.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            ShadeError::InvalidKeyMaterial(_)
                | ShadeError::InvalidKeySize { .. }
                | ShadeError::DecryptionFailure
        )
    }

    /// Returns true if this error is confined to a single candidate or event.
    ///
    /// These never abort a scan over the remaining candidates or events.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            ShadeError::InvalidKeyMaterial(_)
                | ShadeError::InvalidKeySize { .. }
                | ShadeError::MalformedPayload(_)
                | ShadeError::DecryptionFailure
                | ShadeError::StructuralMismatch(_)
                | ShadeError::UnwrapFailure(_)
                | ShadeError::InvalidEvent(_)
        )
    }

    /// Returns true if this error should stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShadeError::ConfigError(_) | ShadeError::InternalError(_))
    }

    /// Returns true if a candidate matched but its message could not be recovered.
    pub fn is_unrecoverable_match(&self) -> bool {
        matches!(
            self,
            ShadeError::StructuralMismatch(_) | ShadeError::UnwrapFailure(_)
        )
    }
}
