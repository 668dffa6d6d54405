//! Domain types for HackShield.
//!
//! - [`DeviceId`]: Pseudonymous 10-character identity tagging every request
//! - [`Block`]: One remote-issued ledger entry
//! - [`BlockLedgerSnapshot`]: Wholesale-replaced local copy of the ledger
//! - [`ImageRef`]: A picked image ready for upload
//! - [`SubmissionRequest`] / [`VerificationRequest`]: Per-action value objects
//! - [`EmbeddedArtifact`] / [`ArtifactRef`]: The returned image and where it landed

mod identity;
mod block;
mod image;
mod request;
mod artifact;

pub use identity::*;
pub use block::*;
pub use image::*;
pub use request::*;
pub use artifact::*;
