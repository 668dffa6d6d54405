//! # HackShield Core
//!
//! Core types, errors, and collaborator traits for the HackShield block client.
//!
//! This crate provides the foundational building blocks used by all other HackShield crates:
//!
//! - **Types**: Device identities, ledger blocks, snapshots, and request value objects
//! - **Errors**: One error taxonomy shared by submission, verification, and ledger sync
//! - **Constants**: Endpoint paths, multipart field names, identity format
//! - **Traits**: Narrow interfaces to the remote Block Service and platform capabilities
//!
//! ## Example
//!
//! ```rust
//! use hackshield_core::{DeviceId, HackshieldError};
//!
//! let id = DeviceId::parse("a1b2c3d4e5").unwrap();
//! assert_eq!(id.as_str().len(), 10);
//! assert!(matches!(DeviceId::parse("XYZ"), Err(HackshieldError::Validation(_))));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{HackshieldError, Result, VerificationFailure};
pub use traits::*;
pub use types::*;
