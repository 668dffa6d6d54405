//! Artifact delivery: durable save + media catalog, or client-side download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument, warn};

use hackshield_core::constants::{ARTIFACT_ALBUM, MSG_SAVE_PERMISSION_DENIED};
use hackshield_core::error::{HackshieldError, Result};
use hackshield_core::traits::{ArtifactSink, MediaCatalog, PermissionPrompt};
use hackshield_core::types::{ArtifactRef, EmbeddedArtifact};

/// File name for an artifact produced at `millis` since the Unix epoch.
///
/// Saved artifacts get `block_<millis>.encoded.png`, downloads `block_<millis>.png`.
pub fn artifact_file_name(saved: bool, millis: i64) -> String {
    if saved {
        format!("block_{}.encoded.png", millis)
    } else {
        format!("block_{}.png", millis)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEDIA LIBRARY SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// Saves artifacts to a documents directory and registers them with a catalog.
///
/// Asks for media permission before writing; a refusal aborts with
/// [`HackshieldError::PermissionDenied`] and writes nothing.
pub struct MediaLibrarySink {
    documents_dir: PathBuf,
    permission: Arc<dyn PermissionPrompt>,
    catalog: Arc<dyn MediaCatalog>,
}

impl MediaLibrarySink {
    /// Creates a sink writing into `documents_dir`.
    pub fn new(
        documents_dir: impl Into<PathBuf>,
        permission: Arc<dyn PermissionPrompt>,
        catalog: Arc<dyn MediaCatalog>,
    ) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            permission,
            catalog,
        }
    }

    /// Directory saved artifacts are written to.
    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }
}

#[async_trait]
impl ArtifactSink for MediaLibrarySink {
    #[instrument(skip(self, artifact), fields(len = artifact.len()))]
    async fn deliver(&self, artifact: &EmbeddedArtifact) -> Result<ArtifactRef> {
        if !self.permission.request_media_access().await?.is_granted() {
            warn!("Media permission refused, artifact not saved");
            return Err(HackshieldError::PermissionDenied(MSG_SAVE_PERMISSION_DENIED.into()));
        }

        fs::create_dir_all(&self.documents_dir).await?;
        let path = self.documents_dir.join(artifact_file_name(true, now_millis()));
        fs::write(&path, artifact.as_bytes()).await?;

        let asset_id = self.catalog.create_asset(&path).await?;
        self.catalog.add_to_album(ARTIFACT_ALBUM, &asset_id).await?;

        debug!(path = %path.display(), asset_id, "Artifact saved");
        Ok(ArtifactRef::Saved { path, asset_id })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIRECTORY CATALOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Media catalog kept as a directory tree.
///
/// ```text
/// <root>/<asset_id>          registered assets
/// <root>/<album>/<asset_id>  album membership
/// ```
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    /// Creates a catalog rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the catalog.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Asset identifiers in an album, sorted.
    pub async fn album(&self, album: &str) -> Result<Vec<String>> {
        let dir = self.root.join(album);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            ids.push(entry.file_name().to_string_lossy().into_owned());
        }
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl MediaCatalog for DirectoryCatalog {
    async fn create_asset(&self, path: &Path) -> Result<String> {
        let asset_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| HackshieldError::Storage(format!("not a file: {}", path.display())))?;

        fs::create_dir_all(&self.root).await?;
        fs::copy(path, self.root.join(&asset_id)).await?;
        Ok(asset_id)
    }

    async fn add_to_album(&self, album: &str, asset_id: &str) -> Result<()> {
        let source = self.root.join(asset_id);
        if !fs::try_exists(&source).await? {
            return Err(HackshieldError::Storage(format!("unknown asset: {}", asset_id)));
        }

        let album_dir = self.root.join(album);
        fs::create_dir_all(&album_dir).await?;
        fs::copy(&source, album_dir.join(asset_id)).await?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOWNLOAD SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// Hands artifacts over as a client-initiated download.
///
/// Always produces a `data:` URL; with a download directory configured the
/// file is also written there, as a browser would.
#[derive(Debug, Default)]
pub struct DownloadSink {
    download_dir: Option<PathBuf>,
}

impl DownloadSink {
    /// Creates a sink that only produces data URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also writes each download into `dir`.
    pub fn with_download_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: Some(dir.into()),
        }
    }
}

#[async_trait]
impl ArtifactSink for DownloadSink {
    #[instrument(skip(self, artifact), fields(len = artifact.len()))]
    async fn deliver(&self, artifact: &EmbeddedArtifact) -> Result<ArtifactRef> {
        let file_name = artifact_file_name(false, now_millis());

        if let Some(dir) = &self.download_dir {
            fs::create_dir_all(dir).await?;
            fs::write(dir.join(&file_name), artifact.as_bytes()).await?;
            debug!(dir = %dir.display(), file_name, "Artifact downloaded");
        }

        Ok(ArtifactRef::Download {
            file_name,
            data_url: artifact.to_data_url(),
        })
    }
}
