//! Embedded artifacts returned by the create endpoint.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::constants::ARTIFACT_MIME;
use crate::error::{HackshieldError, Result};

/// The image with the payload embedded, as returned by the service.
#[derive(Clone, PartialEq, Eq)]
pub struct EmbeddedArtifact {
    bytes: Vec<u8>,
}

impl EmbeddedArtifact {
    /// Wraps raw PNG bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Decodes the service's `image_base64` field.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded.trim())?;
        if bytes.is_empty() {
            return Err(HackshieldError::Submission("empty artifact".into()));
        }
        Ok(Self { bytes })
    }

    /// Re-encodes the artifact as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL suitable for a client-initiated download.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", ARTIFACT_MIME, self.to_base64())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the artifact is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for EmbeddedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedArtifact").field("len", &self.bytes.len()).finish()
    }
}

/// Where a delivered artifact ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactRef {
    /// Written to durable storage and registered with the media catalog.
    Saved {
        /// Local file path, shareable.
        path: PathBuf,
        /// Identifier assigned by the media catalog.
        asset_id: String,
    },
    /// Handed to the platform as a download.
    Download {
        /// Suggested file name.
        file_name: String,
        /// `data:image/png;base64,...` URL.
        data_url: String,
    },
}

impl ArtifactRef {
    /// Local path a share sheet can open, if the artifact was saved.
    pub fn shareable_path(&self) -> Option<&Path> {
        match self {
            ArtifactRef::Saved { path, .. } => Some(path),
            ArtifactRef::Download { .. } => None,
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRef::Saved { path, .. } => write!(f, "{}", path.display()),
            ArtifactRef::Download { file_name, .. } => f.write_str(file_name),
        }
    }
}
