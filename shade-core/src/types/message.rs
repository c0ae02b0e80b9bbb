//! Decrypted message and reporting records.

use serde::{Deserialize, Serialize};

use crate::types::PublicKey;

/// Final decrypted message with the recovered author identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextMessage {
    /// Identity recovered from the stealth envelope
    pub sender: PublicKey,
    /// Decrypted message text
    pub text: String,
}

impl PlaintextMessage {
    /// Creates a new message.
    pub fn new(sender: PublicKey, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }
}

/// A message discovered by the engine, ready for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    /// ID of the event that carried the message (if it came from an event)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Candidate whose key opened the outer layer
    pub candidate: PublicKey,
    /// Position of that candidate in the candidate set
    pub position: usize,
    /// The recovered message
    pub message: PlaintextMessage,
}

impl Disclosure {
    /// Returns true if the outer-layer key and the inner author differ.
    pub fn is_relayed(&self) -> bool {
        self.candidate != self.message.sender
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disclosure_relayed() {
        let a = PublicKey::from_array([1; 32]);
        let b = PublicKey::from_array([2; 32]);
        let direct = Disclosure {
            event_id: None,
            candidate: a,
            position: 0,
            message: PlaintextMessage::new(a, "hi"),
        };
        assert!(!direct.is_relayed());

        let relayed = Disclosure {
            message: PlaintextMessage::new(b, "hi"),
            ..direct
        };
        assert!(relayed.is_relayed());
    }

    #[test]
    fn test_disclosure_json_omits_missing_event_id() {
        let a = PublicKey::from_array([1; 32]);
        let d = Disclosure {
            event_id: None,
            candidate: a,
            position: 0,
            message: PlaintextMessage::new(a, "hi"),
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("event_id"));
    }
}
