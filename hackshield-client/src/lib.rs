//! # HackShield Client
//!
//! Talks to the remote Block Service and runs the two user actions on top of it.
//!
//! ## Endpoints
//!
//! - `POST /encode` - multipart `image`, `recipient`, `device_id`, `secret`
//! - `POST /decode` - multipart `image`, `device_id`
//! - `GET /blocks` - ledger listing
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hackshield_client::{BlockSubmissionClient, HttpBlockService, ServiceConfig};
//! use hackshield_storage::DownloadSink;
//!
//! let service = Arc::new(HttpBlockService::with_config(ServiceConfig::from_env())?);
//! let client = BlockSubmissionClient::new(service, Arc::new(DownloadSink::new()));
//! let submitted = client.submit(Some(image), "Alice", "launch-codes", &device_id).await?;
//! println!("saved to {}", submitted.artifact);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod service;
mod submission;
mod verification;

pub use config::ServiceConfig;
pub use service::HttpBlockService;
pub use submission::{BlockSubmissionClient, ShareOutcome, Submitted};
pub use verification::{BlockVerificationClient, Verified};
