//! AES-256-CBC with PKCS#7 padding.
//!
//! This is the only cipher in the protocol and it is unauthenticated: the
//! padding check is the sole signal that a key "fits" a payload. A wrong key
//! passes it by chance roughly once in 256 attempts, which is why decryption
//! reports [`Decryption`] rather than an error and callers validate the
//! plaintext structurally before trusting it.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{CryptoRng, RngCore};

use shade_core::constants::IV_SIZE;
use shade_core::error::Result;
use shade_core::types::{EncryptedPayload, SharedSecret};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Result of a single CBC decryption attempt.
#[derive(Clone, PartialEq, Eq)]
pub enum Decryption {
    /// Padding was valid; the unpadded bytes.
    Plaintext(Vec<u8>),
    /// Padding (or block alignment) was invalid. Expected for a wrong key.
    PaddingRejected,
}

impl Decryption {
    /// Returns true if the padding check passed.
    pub fn is_plaintext(&self) -> bool {
        matches!(self, Decryption::Plaintext(_))
    }

    /// Returns the plaintext, if any.
    pub fn plaintext(self) -> Option<Vec<u8>> {
        match self {
            Decryption::Plaintext(bytes) => Some(bytes),
            Decryption::PaddingRejected => None,
        }
    }
}

impl std::fmt::Debug for Decryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decryption::Plaintext(bytes) => write!(f, "Plaintext({} bytes)", bytes.len()),
            Decryption::PaddingRejected => f.write_str("PaddingRejected"),
        }
    }
}

/// Encrypts under a fresh random IV.
pub fn encrypt(key: &SharedSecret, plaintext: &[u8]) -> EncryptedPayload {
    encrypt_with_rng(key, plaintext, &mut rand::rngs::OsRng)
}

/// Encrypts under an IV drawn from `rng`.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    key: &SharedSecret,
    plaintext: &[u8],
    rng: &mut R,
) -> EncryptedPayload {
    let mut iv = [0u8; IV_SIZE];
    rng.fill_bytes(&mut iv);
    encrypt_with_iv(key, &iv, plaintext)
}

/// Encrypts under a caller-chosen IV.
///
/// Reusing an IV with the same key leaks plaintext prefixes; outside of known
/// answer tests use [`encrypt`].
pub fn encrypt_with_iv(key: &SharedSecret, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> EncryptedPayload {
    let ciphertext = Aes256CbcEnc::new(&(*key.as_bytes()).into(), &(*iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    EncryptedPayload::new(ciphertext, *iv)
}

/// Decrypts a payload.
///
/// Never fails: bad padding and ciphertext that is not a whole number of
/// blocks both report [`Decryption::PaddingRejected`].
pub fn decrypt(key: &SharedSecret, payload: &EncryptedPayload) -> Decryption {
    let iv = payload.iv();
    match Aes256CbcDec::new(&(*key.as_bytes()).into(), &(*iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(payload.ciphertext())
    {
        Ok(plaintext) => Decryption::Plaintext(plaintext),
        Err(_) => Decryption::PaddingRejected,
    }
}

/// Parses a payload string and decrypts it.
///
/// # Errors
/// `MalformedPayload` if the string is not `<base64>?iv=<base64>`.
pub fn open(key: &SharedSecret, payload: &str) -> Result<Decryption> {
    let payload = EncryptedPayload::parse(payload)?;
    Ok(decrypt(key, &payload))
}
