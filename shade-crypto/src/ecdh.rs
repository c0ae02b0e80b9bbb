//! Stealth-layer shared secret derivation.
//!
//! ## Derivation Flow
//!
//! ```text
//! remote (x-only, 32 bytes)
//!       ↓  prefix 0x02
//! remote point (compressed, 33 bytes)
//!       ↓  × local scalar
//! agreement point, SEC1-compressed (33 bytes)
//!       ↓  bytes [1..33]
//! shared secret (X-coordinate, 32 bytes)
//! ```
//!
//! Dropping the prefix byte ignores the agreement point's parity. Peers
//! slice the compressed point the same way, so the slice offsets are part of
//! the wire protocol: using the full 33-byte output as key material does not
//! interoperate.

use k256::elliptic_curve::sec1::ToEncodedPoint;

use shade_core::constants::{COMPRESSED_POINT_SIZE, SHARED_SECRET_OFFSET, SHARED_SECRET_SIZE};
use shade_core::error::{Result, ShadeError};
use shade_core::types::{PublicKey, SecretKey, SharedSecret};

use crate::keys::{lift_x, to_k256_secret};

/// Derives the stealth-layer shared secret between a local secret and a remote identity.
///
/// Deterministic, and symmetric: `derive(a, B) == derive(b, A)`.
///
/// # Errors
///
/// `InvalidKeyMaterial` if `local` is not a valid scalar or `remote` is not a
/// curve X-coordinate.
///
/// # Example
///
/// ```rust,ignore
/// use shade_crypto::{derive_shared_secret, generate_keypair};
///
/// let alice = generate_keypair();
/// let bob = generate_keypair();
/// assert_eq!(
///     derive_shared_secret(&alice.secret, &bob.public)?,
///     derive_shared_secret(&bob.secret, &alice.public)?,
/// );
/// ```
pub fn derive_shared_secret(local: &SecretKey, remote: &PublicKey) -> Result<SharedSecret> {
    let scalar = to_k256_secret(local)?;
    let point = lift_x(remote)?;

    let agreement = (point.to_projective() * *scalar.to_nonzero_scalar()).to_affine();
    let compressed = agreement.to_encoded_point(true);

    normalize_x(compressed.as_bytes())
}

/// Extracts the key material from a compressed agreement point.
///
/// # Errors
/// `InvalidKeySize` if `compressed` is not a 33-byte SEC1 point.
pub fn normalize_x(compressed: &[u8]) -> Result<SharedSecret> {
    if compressed.len() != COMPRESSED_POINT_SIZE {
        return Err(ShadeError::InvalidKeySize {
            expected: COMPRESSED_POINT_SIZE,
            actual: compressed.len(),
        });
    }
    SharedSecret::from_bytes(&compressed[SHARED_SECRET_OFFSET..SHARED_SECRET_OFFSET + SHARED_SECRET_SIZE])
}
