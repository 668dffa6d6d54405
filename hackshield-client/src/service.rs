//! reqwest implementation of the Block Service.
//!
//! The service answers with a JSON envelope on every status code, so the body
//! is read before the status is judged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use hackshield_core::constants::*;
use hackshield_core::error::{HackshieldError, Result, VerificationFailure};
use hackshield_core::traits::BlockService;
use hackshield_core::types::{Block, EmbeddedArtifact, ImageRef, SubmissionRequest, VerificationRequest};

use crate::config::ServiceConfig;

/// HTTP client for the remote Block Service.
pub struct HttpBlockService {
    config: ServiceConfig,
    http_client: reqwest::Client,
}

impl HttpBlockService {
    /// Creates a client for the default service.
    pub fn new() -> Result<Self> {
        Self::with_config(ServiceConfig::default())
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| HackshieldError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn image_part(image: &ImageRef) -> Result<Part> {
        Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string())
            .mime_str(image.mime())
            .map_err(|e| HackshieldError::Http(format!("invalid image MIME type: {}", e)))
    }
}

#[async_trait]
impl BlockService for HttpBlockService {
    /// The secret travels as an owned `String` inside the multipart form.
    /// That copy belongs to reqwest and is not zeroized when the form drops.
    #[instrument(skip(self, request), fields(device_id = %request.device_id()))]
    async fn create_block(&self, request: &SubmissionRequest) -> Result<EmbeddedArtifact> {
        let form = Form::new()
            .part(FIELD_IMAGE, Self::image_part(request.image())?)
            .text(FIELD_RECIPIENT, request.recipient().to_string())
            .text(FIELD_DEVICE_ID, request.device_id().to_string())
            .text(FIELD_SECRET, request.secret().to_string());

        let response = self
            .http_client
            .post(self.config.endpoint(CREATE_BLOCK_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Create request failed");
                HackshieldError::Submission(MSG_SUBMIT_SERVER_ERROR.into())
            })?;

        let status = response.status();
        let body: CreateBlockResponse = response.json().await.map_err(|e| {
            warn!(%status, error = %e, "Unreadable create response");
            HackshieldError::Submission(MSG_SUBMIT_SERVER_ERROR.into())
        })?;

        match body {
            CreateBlockResponse {
                success: true,
                image_base64: Some(encoded),
                ..
            } if status.is_success() && !encoded.is_empty() => {
                let artifact = EmbeddedArtifact::from_base64(&encoded).map_err(|e| {
                    warn!(error = %e, "Malformed artifact");
                    HackshieldError::Submission(MSG_ENCODING_FAILED.into())
                })?;
                debug!(len = artifact.len(), "Block created");
                Ok(artifact)
            }
            CreateBlockResponse { message, .. } => {
                warn!(%status, message = message.as_deref().unwrap_or(""), "Create rejected");
                Err(HackshieldError::Submission(
                    message.unwrap_or_else(|| MSG_ENCODING_FAILED.into()),
                ))
            }
        }
    }

    #[instrument(skip(self, request), fields(device_id = %request.device_id()))]
    async fn verify_block(&self, request: &VerificationRequest) -> Result<String> {
        let form = Form::new()
            .part(FIELD_IMAGE, Self::image_part(request.image())?)
            .text(FIELD_DEVICE_ID, request.device_id().to_string());

        let transport_error = || {
            HackshieldError::verification(VerificationFailure::Transport, MSG_VERIFY_SERVER_ERROR)
        };

        let response = self
            .http_client
            .post(self.config.endpoint(VERIFY_BLOCK_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Verify request failed");
                transport_error()
            })?;

        let status = response.status();
        let body: VerifyBlockResponse = response.json().await.map_err(|e| {
            warn!(%status, error = %e, "Unreadable verify response");
            transport_error()
        })?;

        match body {
            VerifyBlockResponse {
                success: true,
                secret: Some(secret),
                ..
            } if status.is_success() && !secret.is_empty() => {
                debug!("Block verified");
                Ok(secret)
            }
            VerifyBlockResponse { message, .. } => {
                let kind = match status {
                    StatusCode::FORBIDDEN => VerificationFailure::Unauthorized,
                    s if s.is_server_error() => VerificationFailure::Transport,
                    _ => VerificationFailure::NoBlockFound,
                };
                warn!(%status, ?kind, "Verify returned no payload");
                Err(HackshieldError::verification(
                    kind,
                    message.unwrap_or_else(|| MSG_DECODING_FAILED.into()),
                ))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_blocks(&self) -> Result<Vec<Block>> {
        let response = self
            .http_client
            .get(self.config.endpoint(LIST_BLOCKS_PATH))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "List request failed");
                HackshieldError::Fetch(MSG_FETCH_SERVER_ERROR.into())
            })?;

        let status = response.status();
        let body: ListBlocksResponse = response.json().await.map_err(|e| {
            warn!(%status, error = %e, "Unreadable list response");
            HackshieldError::Fetch(MSG_FETCH_SERVER_ERROR.into())
        })?;

        if !(body.success && status.is_success()) {
            return Err(HackshieldError::Fetch(
                body.message.unwrap_or_else(|| MSG_FETCH_FAILED.into()),
            ));
        }

        debug!(count = body.blocks.len(), "Ledger fetched");
        Ok(body.blocks)
    }
}

#[derive(Debug, Deserialize)]
struct CreateBlockResponse {
    success: bool,
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyBlockResponse {
    success: bool,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListBlocksResponse {
    success: bool,
    #[serde(default)]
    blocks: Vec<Block>,
    #[serde(default)]
    message: Option<String>,
}
