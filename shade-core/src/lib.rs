//! # SHADE Core
//!
//! Core types, errors, and traits for the SHADE stealth messaging engine.
//!
//! This crate provides the foundational building blocks used by all other SHADE crates:
//!
//! - **Types**: Identities, secrets, encrypted payloads, envelopes, and event records
//! - **Errors**: The decryption error taxonomy with classification helpers
//! - **Constants**: Protocol constants, sizes, and configuration keys
//! - **Traits**: Collaborator interfaces (event sources, report sinks)
//!
//! ## Example
//!
//! ```rust
//! use shade_core::{EncryptedPayload, ShadeError};
//!
//! let payload = EncryptedPayload::parse("AAAAAAAAAAAAAAAAAAAAAA==?iv=AAAAAAAAAAAAAAAAAAAAAA==").unwrap();
//! assert_eq!(payload.iv().len(), 16);
//!
//! let err = EncryptedPayload::parse("no delimiter here").unwrap_err();
//! assert!(matches!(err, ShadeError::MalformedPayload(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, ShadeError};
pub use traits::*;
pub use types::*;
