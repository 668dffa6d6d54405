//! Verify-block action.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};
use zeroize::Zeroizing;

use hackshield_core::error::Result;
use hackshield_core::traits::BlockService;
use hackshield_core::types::{DeviceId, ImageRef, VerificationRequest};

/// A recovered payload.
pub struct Verified {
    secret: Zeroizing<String>,
}

impl Verified {
    /// The recovered secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Display line for the recovered secret.
    pub fn message(&self) -> String {
        format!("Message: {}", self.secret.as_str())
    }
}

impl fmt::Debug for Verified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verified").field("secret", &"<redacted>").finish()
    }
}

/// Recovers the payload embedded in an image.
///
/// Each call is an independent round trip; results are never cached.
pub struct BlockVerificationClient {
    service: Arc<dyn BlockService>,
}

impl BlockVerificationClient {
    /// Creates a client.
    pub fn new(service: Arc<dyn BlockService>) -> Self {
        Self { service }
    }

    /// Asks the service to decode `image` on behalf of `device_id`.
    #[instrument(skip(self, image), fields(device_id = %device_id))]
    pub async fn verify(&self, image: Option<ImageRef>, device_id: &DeviceId) -> Result<Verified> {
        let request = VerificationRequest::new(image, device_id.clone())?;
        let secret = self.service.verify_block(&request).await?;
        info!("Payload recovered");

        Ok(Verified {
            secret: Zeroizing::new(secret),
        })
    }
}
