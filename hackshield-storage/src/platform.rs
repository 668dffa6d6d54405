//! Simple platform prompt and picker implementations.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use hackshield_core::error::{HackshieldError, Result};
use hackshield_core::traits::{ImagePicker, PermissionPrompt, PermissionStatus};
use hackshield_core::types::ImageRef;

/// Permission prompt with a fixed answer.
#[derive(Clone, Copy, Debug)]
pub struct StaticPermission(PermissionStatus);

impl StaticPermission {
    /// Always grants access.
    pub fn granted() -> Self {
        Self(PermissionStatus::Granted)
    }

    /// Always refuses access.
    pub fn denied() -> Self {
        Self(PermissionStatus::Denied)
    }
}

#[async_trait]
impl PermissionPrompt for StaticPermission {
    async fn request_media_access(&self) -> Result<PermissionStatus> {
        Ok(self.0)
    }
}

/// Picks an image from a path chosen up front.
///
/// Asks for media permission first; `None` as the path models a cancelled pick.
pub struct PathImagePicker {
    path: Option<PathBuf>,
    permission: Arc<dyn PermissionPrompt>,
}

impl PathImagePicker {
    /// Creates a picker for `path`.
    pub fn new(path: Option<PathBuf>, permission: Arc<dyn PermissionPrompt>) -> Self {
        Self { path, permission }
    }
}

#[async_trait]
impl ImagePicker for PathImagePicker {
    async fn pick(&self) -> Result<Option<ImageRef>> {
        if !self.permission.request_media_access().await?.is_granted() {
            return Err(HackshieldError::PermissionDenied(
                "Permission to access media library is required!".into(),
            ));
        }

        let Some(path) = &self.path else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(path).await?;
        let uri = path.to_string_lossy();
        let image = ImageRef::from_uri(&uri, bytes);
        debug!(name = image.name(), mime = image.mime(), "Image picked");
        Ok(Some(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pick_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let picker = PathImagePicker::new(Some(path), Arc::new(StaticPermission::granted()));
        let image = picker.pick().await.unwrap().unwrap();
        assert_eq!(image.name(), "photo.png");
        assert_eq!(image.mime(), "image/png");
        assert_eq!(image.bytes(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pick_cancelled() {
        let picker = PathImagePicker::new(None, Arc::new(StaticPermission::granted()));
        assert!(picker.pick().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pick_requires_permission() {
        let picker = PathImagePicker::new(
            Some(PathBuf::from("/nonexistent.png")),
            Arc::new(StaticPermission::denied()),
        );
        assert!(matches!(
            picker.pick().await,
            Err(HackshieldError::PermissionDenied(_))
        ));
    }
}
