//! Encrypted payload string format.
//!
//! Both layers of a stealth message carry their ciphertext as
//!
//! ```text
//! <base64(ciphertext)>?iv=<base64(iv)>
//! ```
//!
//! using the standard base64 alphabet with padding. Parsing is strict: a
//! payload that does not match this shape is an input error, never a
//! decryption failure.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::constants::{IV_DELIMITER, IV_SIZE};
use crate::error::{Result, ShadeError};

/// Parsed `<ciphertext>?iv=<iv>` payload.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    ciphertext: Vec<u8>,
    iv: [u8; IV_SIZE],
}

impl EncryptedPayload {
    /// Creates a payload from raw ciphertext and IV.
    pub fn new(ciphertext: Vec<u8>, iv: [u8; IV_SIZE]) -> Self {
        Self { ciphertext, iv }
    }

    /// Parses the string form.
    ///
    /// # Errors
    /// `MalformedPayload` if the delimiter is missing or repeated, a component
    /// is empty or not base64, or the IV is not 16 bytes.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(IV_DELIMITER);
        let (ct_b64, iv_b64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(ct), Some(iv), None) => (ct, iv),
            (_, None, _) => {
                return Err(ShadeError::MalformedPayload(format!(
                    "missing '{}' delimiter",
                    IV_DELIMITER
                )))
            }
            _ => {
                return Err(ShadeError::MalformedPayload(format!(
                    "'{}' delimiter appears more than once",
                    IV_DELIMITER
                )))
            }
        };

        if ct_b64.is_empty() || iv_b64.is_empty() {
            return Err(ShadeError::MalformedPayload(
                "empty ciphertext or iv component".into(),
            ));
        }

        let ciphertext = STANDARD
            .decode(ct_b64)
            .map_err(|e| ShadeError::MalformedPayload(format!("ciphertext: {}", e)))?;
        let iv_bytes = STANDARD
            .decode(iv_b64)
            .map_err(|e| ShadeError::MalformedPayload(format!("iv: {}", e)))?;

        let iv: [u8; IV_SIZE] = iv_bytes.as_slice().try_into().map_err(|_| {
            ShadeError::MalformedPayload(format!(
                "iv must be {} bytes, got {}",
                IV_SIZE,
                iv_bytes.len()
            ))
        })?;

        Ok(Self { ciphertext, iv })
    }

    /// Returns the raw ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Returns the IV.
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// Encodes back to the wire string.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            STANDARD.encode(&self.ciphertext),
            IV_DELIMITER,
            STANDARD.encode(self.iv)
        )
    }
}

impl fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedPayload")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iv", &hex::encode(self.iv))
            .finish()
    }
}

impl FromStr for EncryptedPayload {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for EncryptedPayload {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for EncryptedPayload {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const IV_B64: &str = "AAECAwQFBgcICQoLDA0ODw==";

    #[test]
    fn test_parse_valid() {
        let s = format!("aGVsbG8gd29ybGQhISEhIQ==?iv={}", IV_B64);
        let payload = EncryptedPayload::parse(&s).unwrap();
        assert_eq!(payload.ciphertext(), b"hello world!!!!!");
        assert_eq!(payload.iv(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_encode_matches_input() {
        let s = format!("aGVsbG8gd29ybGQhISEhIQ==?iv={}", IV_B64);
        let payload: EncryptedPayload = s.parse().unwrap();
        assert_eq!(payload.encode(), s);
        assert_eq!(payload.to_string(), s);
    }

    #[test_case("aGVsbG8=" ; "missing delimiter")]
    #[test_case("" ; "empty string")]
    #[test_case("?iv=AAECAwQFBgcICQoLDA0ODw==" ; "empty ciphertext")]
    #[test_case("aGVsbG8=?iv=" ; "empty iv")]
    #[test_case("aGVsbG8=?iv=AAECAwQFBgcICQoLDA0ODw==?iv=AAECAwQFBgcICQoLDA0ODw==" ; "repeated delimiter")]
    #[test_case("!!!notbase64!!!?iv=AAECAwQFBgcICQoLDA0ODw==" ; "bad ciphertext encoding")]
    #[test_case("aGVsbG8=?iv=%%%%" ; "bad iv encoding")]
    #[test_case("aGVsbG8=?iv=AAEC" ; "short iv")]
    fn test_parse_malformed(input: &str) {
        let err = EncryptedPayload::parse(input).unwrap_err();
        assert!(matches!(err, ShadeError::MalformedPayload(_)), "{:?}", err);
    }

    #[test]
    fn test_serde_as_string() {
        let payload = EncryptedPayload::new(vec![7u8; 32], [3u8; IV_SIZE]);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(IV_DELIMITER));
        let back: EncryptedPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_serde_rejects_malformed() {
        let result: std::result::Result<EncryptedPayload, _> = serde_json::from_str("\"plain text\"");
        assert!(result.is_err());
    }
}
