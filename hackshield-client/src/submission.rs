//! Create-block action: validate, submit, deliver the returned artifact.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use hackshield_core::constants::MSG_SHARING_UNAVAILABLE;
use hackshield_core::error::Result;
use hackshield_core::traits::{ArtifactSink, BlockService, ShareSheet};
use hackshield_core::types::{ArtifactRef, DeviceId, ImageRef, SubmissionRequest};

/// A block that was created and delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submitted {
    /// Where the returned artifact ended up.
    pub artifact: ArtifactRef,
}

/// Result of offering an artifact to the share sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The share sheet was opened.
    Shared,
    /// Sharing is not supported on this platform or for this artifact.
    Unavailable,
}

impl ShareOutcome {
    /// Message to show when sharing could not happen.
    pub fn message(self) -> Option<&'static str> {
        match self {
            ShareOutcome::Shared => None,
            ShareOutcome::Unavailable => Some(MSG_SHARING_UNAVAILABLE),
        }
    }
}

/// Submits a secret for embedding and delivers the resulting artifact.
///
/// One call is one attempt. Nothing is retried, and a failed submission has no
/// local side effects.
pub struct BlockSubmissionClient {
    service: Arc<dyn BlockService>,
    sink: Arc<dyn ArtifactSink>,
    share: Option<Arc<dyn ShareSheet>>,
}

impl BlockSubmissionClient {
    /// Creates a client delivering artifacts to `sink`.
    pub fn new(service: Arc<dyn BlockService>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            service,
            sink,
            share: None,
        }
    }

    /// Attaches a share sheet offered after a successful save.
    pub fn with_share_sheet(mut self, share: Arc<dyn ShareSheet>) -> Self {
        self.share = Some(share);
        self
    }

    /// Embeds `secret` addressed to `recipient` into `image`.
    ///
    /// Incomplete inputs fail with `Validation` before any network call. A
    /// refused save permission surfaces as `PermissionDenied` even though the
    /// block was created.
    #[instrument(skip(self, image, secret), fields(device_id = %device_id))]
    pub async fn submit(
        &self,
        image: Option<ImageRef>,
        recipient: &str,
        secret: &str,
        device_id: &DeviceId,
    ) -> Result<Submitted> {
        let request = SubmissionRequest::new(image, recipient, secret, device_id.clone())?;

        let artifact = self.service.create_block(&request).await?;
        drop(request);

        let artifact = self.sink.deliver(&artifact).await?;
        info!(artifact = %artifact, "Block created");

        Ok(Submitted { artifact })
    }

    /// Offers a delivered artifact to the share sheet.
    ///
    /// Downloads and platforms without a share sheet report
    /// [`ShareOutcome::Unavailable`].
    pub async fn share(&self, artifact: &ArtifactRef) -> Result<ShareOutcome> {
        let share = match &self.share {
            Some(share) if artifact.shareable_path().is_some() => share,
            _ => return Ok(ShareOutcome::Unavailable),
        };

        if !share.is_available().await {
            warn!("Share sheet not available");
            return Ok(ShareOutcome::Unavailable);
        }

        share.share(artifact).await?;
        Ok(ShareOutcome::Shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use hackshield_core::constants::{MSG_ENCODING_FAILED, MSG_SAVE_PERMISSION_DENIED, MSG_SUBMIT_INCOMPLETE};
    use hackshield_core::error::HackshieldError;
    use hackshield_core::types::{Block, EmbeddedArtifact, VerificationRequest};
    use hackshield_storage::{DirectoryCatalog, DownloadSink, MediaLibrarySink, StaticPermission};
    use test_case::test_case;

    struct FakeService {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeService {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BlockService for FakeService {
        async fn create_block(&self, request: &SubmissionRequest) -> Result<EmbeddedArtifact> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.recipient(), "Alice");
            if self.fail {
                return Err(HackshieldError::Submission(MSG_ENCODING_FAILED.into()));
            }
            Ok(EmbeddedArtifact::new(b"embedded".to_vec()))
        }

        async fn verify_block(&self, _request: &VerificationRequest) -> Result<String> {
            unreachable!("not used by submission")
        }

        async fn list_blocks(&self) -> Result<Vec<Block>> {
            unreachable!("not used by submission")
        }
    }

    struct FakeShare {
        available: bool,
        shared: AtomicUsize,
    }

    #[async_trait]
    impl ShareSheet for FakeShare {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn share(&self, _artifact: &ArtifactRef) -> Result<()> {
            self.shared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn device_id() -> DeviceId {
        DeviceId::parse("a1b2c3d4e5").unwrap()
    }

    fn image() -> Option<ImageRef> {
        Some(ImageRef::new("photo.jpg", b"jpeg".to_vec()))
    }

    fn saving_client(
        service: Arc<FakeService>,
        dir: &std::path::Path,
        permission: StaticPermission,
    ) -> BlockSubmissionClient {
        let sink = MediaLibrarySink::new(
            dir.join("documents"),
            Arc::new(permission),
            Arc::new(DirectoryCatalog::new(dir.join("library"))),
        );
        BlockSubmissionClient::new(service, Arc::new(sink))
    }

    #[tokio::test]
    async fn test_submit_saves_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let service = FakeService::ok();
        let client = saving_client(service.clone(), dir.path(), StaticPermission::granted());

        let submitted = client.submit(image(), "Alice", "launch-codes", &device_id()).await.unwrap();

        assert_eq!(service.calls(), 1);
        let path = submitted.artifact.shareable_path().unwrap();
        assert!(path.to_string_lossy().ends_with(".encoded.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"embedded");
    }

    #[tokio::test]
    async fn test_submit_download() {
        let client = BlockSubmissionClient::new(FakeService::ok(), Arc::new(DownloadSink::new()));
        let submitted = client.submit(image(), "Alice", "launch-codes", &device_id()).await.unwrap();

        match submitted.artifact {
            ArtifactRef::Download { file_name, data_url } => {
                assert!(file_name.starts_with("block_"));
                assert!(data_url.starts_with("data:image/png;base64,"));
            }
            other => panic!("expected download, got {:?}", other),
        }
    }

    #[test_case(None, "Alice", "launch-codes" ; "no image")]
    #[test_case(image(), "", "launch-codes" ; "no recipient")]
    #[test_case(image(), "Alice", "  " ; "blank secret")]
    #[tokio::test]
    async fn test_submit_guard_makes_no_call(image: Option<ImageRef>, recipient: &str, secret: &str) {
        let service = FakeService::ok();
        let client = BlockSubmissionClient::new(service.clone(), Arc::new(DownloadSink::new()));

        let err = client.submit(image, recipient, secret, &device_id()).await.unwrap_err();

        assert!(err.is_validation_error());
        assert_eq!(err.user_message(), MSG_SUBMIT_INCOMPLETE);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = saving_client(FakeService::failing(), dir.path(), StaticPermission::granted());

        let err = client.submit(image(), "Alice", "launch-codes", &device_id()).await.unwrap_err();

        assert_eq!(err.user_message(), MSG_ENCODING_FAILED);
        assert!(!dir.path().join("documents").exists());
    }

    #[tokio::test]
    async fn test_submit_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let service = FakeService::ok();
        let client = saving_client(service.clone(), dir.path(), StaticPermission::denied());

        let err = client.submit(image(), "Alice", "launch-codes", &device_id()).await.unwrap_err();

        assert!(matches!(err, HackshieldError::PermissionDenied(_)));
        assert_eq!(err.user_message(), MSG_SAVE_PERMISSION_DENIED);
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_share() {
        let dir = tempfile::tempdir().unwrap();
        let share = Arc::new(FakeShare {
            available: true,
            shared: AtomicUsize::new(0),
        });
        let client = saving_client(FakeService::ok(), dir.path(), StaticPermission::granted())
            .with_share_sheet(share.clone());

        let submitted = client.submit(image(), "Alice", "launch-codes", &device_id()).await.unwrap();
        assert_eq!(client.share(&submitted.artifact).await.unwrap(), ShareOutcome::Shared);
        assert_eq!(share.shared.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_share_unavailable() {
        let share = Arc::new(FakeShare {
            available: false,
            shared: AtomicUsize::new(0),
        });
        let dir = tempfile::tempdir().unwrap();
        let client = saving_client(FakeService::ok(), dir.path(), StaticPermission::granted())
            .with_share_sheet(share.clone());
        let submitted = client.submit(image(), "Alice", "launch-codes", &device_id()).await.unwrap();

        let outcome = client.share(&submitted.artifact).await.unwrap();
        assert_eq!(outcome, ShareOutcome::Unavailable);
        assert_eq!(outcome.message(), Some(MSG_SHARING_UNAVAILABLE));
        assert_eq!(share.shared.load(Ordering::SeqCst), 0);

        let download = ArtifactRef::Download {
            file_name: "block_1.png".into(),
            data_url: "data:image/png;base64,AA==".into(),
        };
        assert_eq!(client.share(&download).await.unwrap(), ShareOutcome::Unavailable);
    }
}
