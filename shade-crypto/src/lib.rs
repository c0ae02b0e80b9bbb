//! # SHADE Cryptography
//!
//! secp256k1 and AES primitives for the SHADE stealth messaging scheme.
//!
//! This crate provides:
//!
//! - **Keys**: x-only key pairs, public key recovery, point lifting
//! - **ECDH**: Stealth-layer shared secret (X-coordinate of the agreement point)
//! - **CBC**: AES-256-CBC with PKCS#7 over the `<ct>?iv=<iv>` payload format
//! - **NIP-04**: The network's direct-message cipher, used for the inner layer
//!
//! ## Security Properties
//!
//! - Secret keys and shared secrets are zeroized on drop
//! - Shared secrets compare in constant time
//! - The cipher is unauthenticated: a padding pass is a candidate match, not proof
//!
//! ## Example
//!
//! ```rust,ignore
//! use shade_crypto::{cbc, derive_shared_secret, generate_keypair};
//!
//! let sender = generate_keypair();
//! let receiver = generate_keypair();
//!
//! // Sender encrypts under the shared secret
//! let key = derive_shared_secret(&sender.secret, &receiver.public)?;
//! let payload = cbc::encrypt(&key, b"hello");
//!
//! // Receiver derives the same key from the other side
//! let key = derive_shared_secret(&receiver.secret, &sender.public)?;
//! assert!(cbc::decrypt(&key, &payload).is_plaintext());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod cbc;
pub mod ecdh;
pub mod keys;
pub mod nip04;

// Re-export main functions at crate root
pub use cbc::Decryption;
pub use ecdh::derive_shared_secret;
pub use keys::{generate_keypair, generate_keypair_with, keypair_from_secret, public_key_from_secret};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Both sides of any key pair derive the same secret.
        #[test]
        fn derivation_symmetric(seed_a in any::<u64>(), seed_b in any::<u64>()) {
            let a = generate_keypair_with(&mut ChaCha20Rng::seed_from_u64(seed_a));
            let b = generate_keypair_with(&mut ChaCha20Rng::seed_from_u64(seed_b));
            prop_assert_eq!(
                derive_shared_secret(&a.secret, &b.public).unwrap(),
                derive_shared_secret(&b.secret, &a.public).unwrap()
            );
        }

        /// Any plaintext survives encrypt then decrypt under the same key.
        #[test]
        fn cbc_roundtrip(key in any::<[u8; 32]>(), pt in prop::collection::vec(any::<u8>(), 0..512)) {
            let key = shade_core::SharedSecret::from_array(key);
            let payload = cbc::encrypt(&key, &pt);
            prop_assert_eq!(payload.ciphertext().len() % 16, 0);
            prop_assert_eq!(cbc::decrypt(&key, &payload), Decryption::Plaintext(pt));
        }

        /// Decrypting arbitrary bytes never panics.
        #[test]
        fn cbc_decrypt_total(key in any::<[u8; 32]>(), ct in prop::collection::vec(any::<u8>(), 0..128), iv in any::<[u8; 16]>()) {
            let key = shade_core::SharedSecret::from_array(key);
            let _ = cbc::decrypt(&key, &shade_core::EncryptedPayload::new(ct, iv));
        }
    }
}
