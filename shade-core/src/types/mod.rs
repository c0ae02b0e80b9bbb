//! Domain types for SHADE.
//!
//! This module provides all the core data structures used throughout the protocol:
//!
//! - [`PublicKey`], [`SecretKey`], [`KeyPair`], [`SharedSecret`]: key material
//! - [`EncryptedPayload`]: `<base64>?iv=<base64>` ciphertext container
//! - [`StealthEnvelope`]: decrypted outer layer naming the true author
//! - [`PlaintextMessage`], [`Disclosure`]: decrypted results
//! - [`Event`], [`EventFilter`]: inbound records and local subscription filter

mod keys;
mod payload;
mod envelope;
mod message;
mod event;

pub use keys::*;
pub use payload::*;
pub use envelope::*;
pub use message::*;
pub use event::*;
