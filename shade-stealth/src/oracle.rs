//! Trial decryption oracle.
//!
//! A stealth payload does not say who sent it. The receiver derives a key
//! against every known candidate, in order, and the first key that passes
//! the CBC padding check names the sender.
//!
//! ## Scan Flow
//!
//! ```text
//! for (position, candidate) in candidates:
//!     key = derive(receiver, candidate)      invalid key → skip
//!     decrypt(key, payload)                  padding rejected → next
//!     return Match { candidate, position, plaintext }
//! NoMatch
//! ```
//!
//! A match only means the padding passed. Roughly one wrong key in 256 gets
//! through, so callers must validate the plaintext (see [`crate::unwrap`]).

use std::fmt;

use tracing::{debug, trace};

use shade_core::error::{Result, ShadeError};
use shade_core::types::{EncryptedPayload, PublicKey, SecretKey};
use shade_crypto::cbc::{self, Decryption};
use shade_crypto::derive_shared_secret;

// ═══════════════════════════════════════════════════════════════════════════════
// CANDIDATE SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered, non-empty list of identities that may have sent a payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<PublicKey>,
}

impl CandidateSet {
    /// Creates a candidate set.
    ///
    /// # Errors
    /// `ConfigError` if `candidates` is empty.
    pub fn new(candidates: Vec<PublicKey>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(ShadeError::ConfigError("candidate set is empty".into()));
        }
        Ok(Self { candidates })
    }

    /// Parses a comma-separated list of hex identities.
    ///
    /// Whitespace around entries is ignored, as are empty entries.
    pub fn parse_list(list: &str) -> Result<Self> {
        let candidates = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                PublicKey::from_hex(entry).map_err(|e| {
                    ShadeError::ConfigError(format!("invalid candidate '{}': {}", entry, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(candidates)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if there are no candidates. Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate at `position`.
    pub fn get(&self, position: usize) -> Option<&PublicKey> {
        self.candidates.get(position)
    }

    /// Returns true if `key` is a candidate.
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.candidates.contains(key)
    }

    /// Iterates in scan order.
    pub fn iter(&self) -> std::slice::Iter<'_, PublicKey> {
        self.candidates.iter()
    }

    /// Returns the candidates as a slice.
    pub fn as_slice(&self) -> &[PublicKey] {
        &self.candidates
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a PublicKey;
    type IntoIter = std::slice::Iter<'a, PublicKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTCOMES
// ═══════════════════════════════════════════════════════════════════════════════

/// A candidate whose key passed the padding check.
#[derive(Clone, PartialEq, Eq)]
pub struct StealthMatch {
    /// The matching candidate
    pub candidate: PublicKey,
    /// Its position in the candidate set
    pub position: usize,
    /// Decrypted outer-layer bytes (not yet validated)
    pub plaintext: Vec<u8>,
}

impl fmt::Debug for StealthMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StealthMatch")
            .field("candidate", &self.candidate)
            .field("position", &self.position)
            .field("plaintext_len", &self.plaintext.len())
            .finish()
    }
}

/// Result of scanning a candidate set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    /// First candidate that passed padding
    Match(StealthMatch),
    /// No candidate passed padding
    NoMatch,
}

impl TrialOutcome {
    /// Returns true on a match.
    pub fn is_match(&self) -> bool {
        matches!(self, TrialOutcome::Match(_))
    }

    /// Returns the match, if any.
    pub fn into_match(self) -> Option<StealthMatch> {
        match self {
            TrialOutcome::Match(m) => Some(m),
            TrialOutcome::NoMatch => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN
// ═══════════════════════════════════════════════════════════════════════════════

/// Finds the first candidate whose shared key opens `payload`.
///
/// Later candidates are never tried once one passes.
pub fn find_sender(
    receiver: &SecretKey,
    candidates: &CandidateSet,
    payload: &EncryptedPayload,
) -> TrialOutcome {
    candidates
        .iter()
        .enumerate()
        .find_map(|(position, candidate)| try_candidate(receiver, candidate, position, payload))
        .map_or(TrialOutcome::NoMatch, TrialOutcome::Match)
}

/// Returns every candidate whose key passes padding, in order.
///
/// Diagnostic only: more than one entry means all but (at most) one are
/// padding false positives.
pub fn find_all_senders(
    receiver: &SecretKey,
    candidates: &CandidateSet,
    payload: &EncryptedPayload,
) -> Vec<StealthMatch> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(position, candidate)| try_candidate(receiver, candidate, position, payload))
        .collect()
}

fn try_candidate(
    receiver: &SecretKey,
    candidate: &PublicKey,
    position: usize,
    payload: &EncryptedPayload,
) -> Option<StealthMatch> {
    let key = match derive_shared_secret(receiver, candidate) {
        Ok(key) => key,
        Err(e) => {
            debug!(candidate = %candidate.short(), position, error = %e, "skipping candidate");
            return None;
        }
    };

    match cbc::decrypt(&key, payload) {
        Decryption::Plaintext(plaintext) => Some(StealthMatch {
            candidate: *candidate,
            position,
            plaintext,
        }),
        Decryption::PaddingRejected => {
            trace!(candidate = %candidate.short(), position, "padding rejected");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shade_core::types::KeyPair;
    use shade_crypto::generate_keypair;

    /// Generates an identity whose key is rejected by padding for `payload`.
    pub(crate) fn rejecting_candidate(receiver: &SecretKey, payload: &EncryptedPayload) -> PublicKey {
        loop {
            let kp = generate_keypair();
            let key = derive_shared_secret(receiver, &kp.public).unwrap();
            if !cbc::decrypt(&key, payload).is_plaintext() {
                return kp.public;
            }
        }
    }

    fn payload_from(sender: &KeyPair, receiver: &PublicKey, text: &[u8]) -> EncryptedPayload {
        let key = derive_shared_secret(&sender.secret, receiver).unwrap();
        cbc::encrypt(&key, text)
    }

    #[test]
    fn test_candidate_set_rejects_empty() {
        assert!(matches!(CandidateSet::new(vec![]), Err(ShadeError::ConfigError(_))));
        assert!(matches!(CandidateSet::parse_list(" , "), Err(ShadeError::ConfigError(_))));
    }

    #[test]
    fn test_candidate_set_parse_list() {
        let a = PublicKey::from_array([0x11; 32]);
        let b = PublicKey::from_array([0x22; 32]);
        let set = CandidateSet::parse_list(&format!(" {} ,{},", a, b)).unwrap();
        assert_eq!(set.as_slice(), &[a, b]);
        assert!(set.contains(&b));
        assert_eq!(set.get(1), Some(&b));
    }

    #[test]
    fn test_candidate_set_parse_list_bad_entry() {
        let err = CandidateSet::parse_list("abcd").unwrap_err();
        assert!(matches!(err, ShadeError::ConfigError(_)));
    }

    #[test]
    fn test_single_candidate_match() {
        let receiver = generate_keypair();
        let sender = generate_keypair();
        let payload = payload_from(&sender, &receiver.public, b"outer");

        let candidates = CandidateSet::new(vec![sender.public]).unwrap();
        let m = find_sender(&receiver.secret, &candidates, &payload).into_match().unwrap();
        assert_eq!(m.candidate, sender.public);
        assert_eq!(m.position, 0);
        assert_eq!(m.plaintext, b"outer");
    }

    #[test]
    fn test_match_at_later_position() {
        let receiver = generate_keypair();
        let sender = generate_keypair();
        let payload = payload_from(&sender, &receiver.public, b"outer");

        let x = rejecting_candidate(&receiver.secret, &payload);
        let y = rejecting_candidate(&receiver.secret, &payload);
        let z = generate_keypair().public;
        let candidates = CandidateSet::new(vec![x, y, sender.public, z]).unwrap();

        let m = find_sender(&receiver.secret, &candidates, &payload).into_match().unwrap();
        assert_eq!(m.candidate, sender.public);
        assert_eq!(m.position, 2);
    }

    #[test]
    fn test_no_match() {
        let receiver = generate_keypair();
        let sender = generate_keypair();
        let payload = payload_from(&sender, &receiver.public, b"outer");

        let candidates = CandidateSet::new(vec![
            rejecting_candidate(&receiver.secret, &payload),
            rejecting_candidate(&receiver.secret, &payload),
        ])
        .unwrap();
        assert_eq!(find_sender(&receiver.secret, &candidates, &payload), TrialOutcome::NoMatch);
        assert!(find_all_senders(&receiver.secret, &candidates, &payload).is_empty());
    }

    #[test]
    fn test_invalid_candidate_skipped() {
        let receiver = generate_keypair();
        let sender = generate_keypair();
        let payload = payload_from(&sender, &receiver.public, b"outer");

        let off_curve = PublicKey::from_array([0xFF; 32]);
        let candidates = CandidateSet::new(vec![off_curve, sender.public]).unwrap();

        let m = find_sender(&receiver.secret, &candidates, &payload).into_match().unwrap();
        assert_eq!(m.position, 1);
    }

    #[test]
    fn test_find_all_includes_true_sender() {
        let receiver = generate_keypair();
        let sender = generate_keypair();
        let payload = payload_from(&sender, &receiver.public, b"outer");

        let candidates = CandidateSet::new(vec![
            generate_keypair().public,
            sender.public,
            generate_keypair().public,
        ])
        .unwrap();
        let all = find_all_senders(&receiver.secret, &candidates, &payload);
        assert!(all.iter().any(|m| m.candidate == sender.public && m.position == 1));
        assert!(all.windows(2).all(|w| w[0].position < w[1].position));
    }

    #[test]
    fn test_first_success_wins_on_duplicates() {
        let receiver = generate_keypair();
        let sender = generate_keypair();
        let payload = payload_from(&sender, &receiver.public, b"outer");

        let candidates = CandidateSet::new(vec![sender.public, sender.public]).unwrap();
        let m = find_sender(&receiver.secret, &candidates, &payload).into_match().unwrap();
        assert_eq!(m.position, 0);
        assert_eq!(find_all_senders(&receiver.secret, &candidates, &payload).len(), 2);
    }

    #[test]
    fn test_interoperates_with_external_encoder() {
        // Produced by node's crypto: secp256k1 ECDH, X-coordinate key, aes-256-cbc.
        let receiver = SecretKey::from_array([0x22; 32]);
        let sender = PublicKey::from_hex(
            "4f355bdcb7cc0af728ef3cceb9615d90684bb5b2ca5f859ab0f0b704075871aa",
        )
        .unwrap();
        let payload =
            EncryptedPayload::parse("9GlVO37cTZTnT8Fo0EJZFg==?iv=BwcHBwcHBwcHBwcHBwcHBw==").unwrap();

        let candidates = CandidateSet::new(vec![sender]).unwrap();
        let m = find_sender(&receiver, &candidates, &payload).into_match().unwrap();
        assert_eq!(m.candidate, sender);
        assert_eq!(m.plaintext, b"hello from node");
    }

    #[test]
    fn test_debug_hides_plaintext() {
        let m = StealthMatch {
            candidate: PublicKey::from_array([1; 32]),
            position: 0,
            plaintext: b"top secret".to_vec(),
        };
        assert!(!format!("{:?}", m).contains("top secret"));
    }
}
