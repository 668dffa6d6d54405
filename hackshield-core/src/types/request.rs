//! Per-action request value objects.
//!
//! Construction validates every precondition, so a request that exists is
//! always safe to send.

use std::fmt;

use zeroize::Zeroizing;

use crate::constants::{MSG_SUBMIT_INCOMPLETE, MSG_VERIFY_NO_IMAGE};
use crate::error::{HackshieldError, Result};
use crate::types::{DeviceId, ImageRef};

/// Inputs for the create-block endpoint.
pub struct SubmissionRequest {
    image: ImageRef,
    recipient: String,
    secret: Zeroizing<String>,
    device_id: DeviceId,
}

impl SubmissionRequest {
    /// Validates inputs and builds the request.
    ///
    /// Fails with [`HackshieldError::Validation`] when the image is missing or
    /// empty, or when the recipient or secret is blank.
    pub fn new(
        image: Option<ImageRef>,
        recipient: &str,
        secret: &str,
        device_id: DeviceId,
    ) -> Result<Self> {
        let image = match image {
            Some(image) if !image.is_empty() => image,
            _ => return Err(HackshieldError::Validation(MSG_SUBMIT_INCOMPLETE.into())),
        };
        if recipient.trim().is_empty() || secret.trim().is_empty() {
            return Err(HackshieldError::Validation(MSG_SUBMIT_INCOMPLETE.into()));
        }

        Ok(Self {
            image,
            recipient: recipient.to_string(),
            secret: Zeroizing::new(secret.to_string()),
            device_id,
        })
    }

    /// Image to embed into.
    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    /// Intended recipient.
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Secret payload.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Submitting identity.
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

impl fmt::Debug for SubmissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionRequest")
            .field("image", &self.image)
            .field("recipient", &self.recipient)
            .field("secret", &"<redacted>")
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// Inputs for the verify-block endpoint.
#[derive(Debug)]
pub struct VerificationRequest {
    image: ImageRef,
    device_id: DeviceId,
}

impl VerificationRequest {
    /// Validates inputs and builds the request.
    pub fn new(image: Option<ImageRef>, device_id: DeviceId) -> Result<Self> {
        match image {
            Some(image) if !image.is_empty() => Ok(Self { image, device_id }),
            _ => Err(HackshieldError::Validation(MSG_VERIFY_NO_IMAGE.into())),
        }
    }

    /// Image to decode.
    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    /// Verifying identity.
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn id() -> DeviceId {
        DeviceId::parse("a1b2c3d4e5").unwrap()
    }

    fn image() -> Option<ImageRef> {
        Some(ImageRef::new("photo.png", vec![0x89, 0x50, 0x4E, 0x47]))
    }

    #[test]
    fn test_submission_valid() {
        let req = SubmissionRequest::new(image(), "Alice", "launch-codes", id()).unwrap();
        assert_eq!(req.recipient(), "Alice");
        assert_eq!(req.secret(), "launch-codes");
        assert_eq!(req.device_id().as_str(), "a1b2c3d4e5");
    }

    #[test_case(None, "Alice", "launch-codes" ; "missing image")]
    #[test_case(Some(ImageRef::new("a.png", vec![])), "Alice", "launch-codes" ; "empty image")]
    #[test_case(image(), "", "launch-codes" ; "empty recipient")]
    #[test_case(image(), "   ", "launch-codes" ; "blank recipient")]
    #[test_case(image(), "Alice", "" ; "empty secret")]
    fn test_submission_guard(image: Option<ImageRef>, recipient: &str, secret: &str) {
        let err = SubmissionRequest::new(image, recipient, secret, id()).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_submission_debug_redacts_secret() {
        let req = SubmissionRequest::new(image(), "Alice", "launch-codes", id()).unwrap();
        let debug = format!("{:?}", req);
        assert!(!debug.contains("launch-codes"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_verification_guard() {
        assert!(VerificationRequest::new(image(), id()).is_ok());
        let err = VerificationRequest::new(None, id()).unwrap_err();
        assert_eq!(err.user_message(), MSG_VERIFY_NO_IMAGE);
    }
}
