//! Protocol constants for SHADE.
//!
//! Key sizes follow secp256k1 with x-only (BIP-340 style) identities, the form
//! used natively by the event network. Cipher sizes follow AES-256-CBC.

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an x-only public key (network identity) in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a secp256k1 secret scalar in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of a SEC1 compressed curve point in bytes (prefix + X-coordinate).
pub const COMPRESSED_POINT_SIZE: usize = 33;

/// Compressed-point prefix used to lift an x-only identity onto the curve.
///
/// Identities omit the parity byte; both layers of the protocol assume the
/// even-Y point.
pub const EVEN_Y_PREFIX: u8 = 0x02;

/// Size of the normalized shared secret (X-coordinate of the ECDH point).
pub const SHARED_SECRET_SIZE: usize = 32;

/// Offset of the X-coordinate inside a compressed point.
pub const SHARED_SECRET_OFFSET: usize = 1;

// ═══════════════════════════════════════════════════════════════════════════════
// SYMMETRIC CIPHER
// ═══════════════════════════════════════════════════════════════════════════════

/// AES block size in bytes (also the CBC IV size).
pub const AES_BLOCK_SIZE: usize = 16;

/// Size of the CBC initialization vector in bytes.
pub const IV_SIZE: usize = AES_BLOCK_SIZE;

/// Delimiter between ciphertext and IV in the payload string form.
pub const IV_DELIMITER: &str = "?iv=";

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT NETWORK
// ═══════════════════════════════════════════════════════════════════════════════

/// Event kind carrying stealth messages.
pub const STEALTH_EVENT_KIND: u32 = 1337;

/// Tag name that references a public key (used for channel subscription).
pub const PUBKEY_TAG: &str = "p";

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment variable holding the receiver's hex secret key.
pub const ENV_RECEIVER_SECRET: &str = "RPRIV";

/// Environment variable holding comma-separated candidate sender public keys.
pub const ENV_CANDIDATES: &str = "SPUB";

/// Environment variable holding the channel public key to filter on.
pub const ENV_CHANNEL: &str = "CHANPUB";

// ═══════════════════════════════════════════════════════════════════════════════
// PERFORMANCE TUNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default capacity of the inbound event channel.
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secp256k1_sizes() {
        assert_eq!(PUBLIC_KEY_SIZE, 32);
        assert_eq!(SECRET_KEY_SIZE, 32);
        assert_eq!(COMPRESSED_POINT_SIZE, PUBLIC_KEY_SIZE + 1);
        assert_eq!(SHARED_SECRET_OFFSET + SHARED_SECRET_SIZE, COMPRESSED_POINT_SIZE);
    }

    #[test]
    fn test_iv_is_one_block() {
        assert_eq!(IV_SIZE, AES_BLOCK_SIZE);
    }

    #[test]
    fn test_config_keys_unique() {
        let keys = [ENV_RECEIVER_SECRET, ENV_CANDIDATES, ENV_CHANNEL];
        for (i, a) in keys.iter().enumerate() {
            for (j, b) in keys.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
    }
}
