//! secp256k1 key handling for x-only identities.
//!
//! Network identities are the 32-byte X-coordinate of a public point. To do
//! curve arithmetic with one, it is lifted back to a full point by assuming
//! even Y (compressed prefix `0x02`). Because ECDH only ever exposes the
//! X-coordinate of the agreement point, the parity choice never changes a
//! derived secret.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use shade_core::constants::{COMPRESSED_POINT_SIZE, EVEN_Y_PREFIX, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
use shade_core::error::{Result, ShadeError};
use shade_core::types::{KeyPair, PublicKey, SecretKey};

// ═══════════════════════════════════════════════════════════════════════════════
// KEY GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Generates a new random identity using the OS RNG.
pub fn generate_keypair() -> KeyPair {
    generate_keypair_with(&mut rand::rngs::OsRng)
}

/// Generates a new identity from the given RNG.
///
/// Tests pass a seeded `ChaCha20Rng` for reproducible keys.
pub fn generate_keypair_with<R: RngCore + CryptoRng>(rng: &mut R) -> KeyPair {
    let secret = k256::SecretKey::random(rng);
    let public = x_only(&secret.public_key());

    let mut scalar = [0u8; SECRET_KEY_SIZE];
    scalar.copy_from_slice(&secret.to_bytes());
    let keypair = KeyPair::new(public, SecretKey::from_array(scalar));
    scalar.zeroize();
    keypair
}

/// Builds the key pair for an existing secret.
pub fn keypair_from_secret(secret: &SecretKey) -> Result<KeyPair> {
    let public = public_key_from_secret(secret)?;
    Ok(KeyPair::new(public, secret.clone()))
}

/// Computes the x-only identity of a secret key.
pub fn public_key_from_secret(secret: &SecretKey) -> Result<PublicKey> {
    Ok(x_only(&to_k256_secret(secret)?.public_key()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Converts to a curve scalar.
///
/// # Errors
/// `InvalidKeyMaterial` if the scalar is zero or not below the curve order.
pub fn to_k256_secret(secret: &SecretKey) -> Result<k256::SecretKey> {
    k256::SecretKey::from_slice(secret.as_bytes())
        .map_err(|_| ShadeError::InvalidKeyMaterial("secret scalar out of range".into()))
}

/// Lifts an x-only identity to a curve point (even Y).
///
/// # Errors
/// `InvalidKeyMaterial` if the X-coordinate is not on the curve.
pub fn lift_x(public: &PublicKey) -> Result<k256::PublicKey> {
    let mut sec1 = [0u8; COMPRESSED_POINT_SIZE];
    sec1[0] = EVEN_Y_PREFIX;
    sec1[1..].copy_from_slice(public.as_bytes());

    k256::PublicKey::from_sec1_bytes(&sec1).map_err(|_| {
        ShadeError::InvalidKeyMaterial(format!("{} is not a curve point", public.short()))
    })
}

/// Drops the parity byte of a point, keeping the X-coordinate.
fn x_only(public: &k256::PublicKey) -> PublicKey {
    let encoded = public.to_encoded_point(true);
    let mut bytes = [0u8; PUBLIC_KEY_SIZE];
    bytes.copy_from_slice(&encoded.as_bytes()[1..COMPRESSED_POINT_SIZE]);
    PublicKey::from_array(bytes)
}
