//! # HackShield Identity
//!
//! Derives the pseudonymous device identity that tags every submission and
//! verification.
//!
//! ```text
//! identity = hex(SHA-256(fingerprint))[..10]
//! ```
//!
//! The fingerprint comes from browser environment signals or from a native
//! hardware fallback chain. A deriver is built once per installation, shared,
//! and memoizes its result.
//!
//! ## Example
//!
//! ```rust
//! use hackshield_identity::{DeviceIdentityDeriver, HardwareSignals};
//!
//! let deriver = DeviceIdentityDeriver::native(HardwareSignals {
//!     os_build_id: Some("UP1A.231005.007".into()),
//!     ..Default::default()
//! });
//! let id = deriver.derive().unwrap();
//! assert_eq!(id.as_str().len(), 10);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod deriver;
mod signals;

pub use deriver::{fingerprint_digest, identity_from_fingerprint, DeviceIdentityDeriver};
pub use signals::{EnvironmentSignals, HardwareSignals, Platform};
