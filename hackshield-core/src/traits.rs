//! Collaborator traits for HackShield.
//!
//! The remote Block Service and every platform capability are reached through
//! these narrow interfaces so the client logic can run against fakes in tests.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ArtifactRef, Block, EmbeddedArtifact, ImageRef, SubmissionRequest, VerificationRequest};

// ═══════════════════════════════════════════════════════════════════════════════
// REMOTE BLOCK SERVICE
// ═══════════════════════════════════════════════════════════════════════════════

/// The remote service that embeds, decodes, and lists blocks.
#[async_trait]
pub trait BlockService: Send + Sync {
    /// Embeds the secret into the image and records a new block.
    ///
    /// Fails with `Submission` on `success: false` or transport failure.
    async fn create_block(&self, request: &SubmissionRequest) -> Result<EmbeddedArtifact>;

    /// Recovers the secret embedded in the image.
    ///
    /// Fails with `Verification` when no payload comes back.
    async fn verify_block(&self, request: &VerificationRequest) -> Result<String>;

    /// Lists the ledger in service order.
    ///
    /// Fails with `Fetch`.
    async fn list_blocks(&self) -> Result<Vec<Block>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLATFORM CAPABILITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Persistent string key-value storage (browser local storage or a file).
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes a value. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Outcome of a permission prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user allowed access.
    Granted,
    /// The user refused access.
    Denied,
}

impl PermissionStatus {
    /// Returns true if access was granted.
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Platform permission prompt for the media library.
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    /// Asks for media library access.
    async fn request_media_access(&self) -> Result<PermissionStatus>;
}

/// Platform media catalog (photo library).
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Registers a file as a media asset and returns its identifier.
    async fn create_asset(&self, path: &Path) -> Result<String>;

    /// Places an asset into a named album, creating the album if needed.
    async fn add_to_album(&self, album: &str, asset_id: &str) -> Result<()>;
}

/// Destination for a returned artifact (saved file or browser download).
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Delivers the artifact and returns where it ended up.
    async fn deliver(&self, artifact: &EmbeddedArtifact) -> Result<ArtifactRef>;
}

/// Platform share sheet.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// Returns true if sharing is supported here.
    async fn is_available(&self) -> bool;

    /// Opens the share sheet for a delivered artifact.
    async fn share(&self, artifact: &ArtifactRef) -> Result<()>;
}

/// Platform image picker.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Lets the user choose an image. `None` means the user cancelled.
    async fn pick(&self) -> Result<Option<ImageRef>>;
}
