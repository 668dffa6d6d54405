//! Protocol constants for HackShield.
//!
//! Paths and field names match the remote Block Service; changing any of them
//! breaks wire compatibility.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// DEVICE IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of lowercase hex characters in a device identity.
pub const DEVICE_ID_LEN: usize = 10;

/// Storage key under which the derived identity is persisted.
pub const DEVICE_ID_STORAGE_KEY: &str = "web_device_id";

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK SERVICE ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default Block Service base URL.
pub const DEFAULT_SERVICE_URL: &str = "https://hacksheild-backend.onrender.com";

/// Create-block endpoint (embed payload into image).
pub const CREATE_BLOCK_PATH: &str = "/encode";

/// Verify-block endpoint (recover payload from image).
pub const VERIFY_BLOCK_PATH: &str = "/decode";

/// Ledger listing endpoint.
pub const LIST_BLOCKS_PATH: &str = "/blocks";

// ═══════════════════════════════════════════════════════════════════════════════
// MULTIPART FIELDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Binary image part.
pub const FIELD_IMAGE: &str = "image";

/// Recipient text part.
pub const FIELD_RECIPIENT: &str = "recipient";

/// Device identity text part.
pub const FIELD_DEVICE_ID: &str = "device_id";

/// Secret payload text part.
pub const FIELD_SECRET: &str = "secret";

// ═══════════════════════════════════════════════════════════════════════════════
// IMAGES & ARTIFACTS
// ═══════════════════════════════════════════════════════════════════════════════

/// File name used when a picked image reference carries none.
pub const DEFAULT_IMAGE_NAME: &str = "image.jpg";

/// MIME type of every artifact returned by the service.
pub const ARTIFACT_MIME: &str = "image/png";

/// Media catalog album that saved artifacts are registered into.
pub const ARTIFACT_ALBUM: &str = "gallery";

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER SYNC
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed interval between timer-driven ledger fetches.
pub const LEDGER_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Characters of a block hash shown in a ledger row.
pub const HASH_PREVIEW_LEN: usize = 12;

// ═══════════════════════════════════════════════════════════════════════════════
// USER-FACING MESSAGES
// ═══════════════════════════════════════════════════════════════════════════════

/// Shown when submission inputs are incomplete.
pub const MSG_SUBMIT_INCOMPLETE: &str = "Please fill in all fields and upload an image.";

/// Shown when verification has no image.
pub const MSG_VERIFY_NO_IMAGE: &str = "Please select an image";

/// Service declined to embed.
pub const MSG_ENCODING_FAILED: &str = "Encoding failed.";

/// Service declined to decode and gave no reason.
pub const MSG_DECODING_FAILED: &str = "Decoding failed.";

/// Transport failure during submission.
pub const MSG_SUBMIT_SERVER_ERROR: &str = "Server error occurred.";

/// Transport failure during verification.
pub const MSG_VERIFY_SERVER_ERROR: &str = "Server error while decoding.";

/// Service declined to list the ledger.
pub const MSG_FETCH_FAILED: &str = "Failed to fetch blocks";

/// Transport failure during a ledger fetch.
pub const MSG_FETCH_SERVER_ERROR: &str = "Server error while fetching blocks";

/// Storage permission refused while saving an artifact.
pub const MSG_SAVE_PERMISSION_DENIED: &str = "Permission to save image denied.";

/// Share sheet not available on this platform.
pub const MSG_SHARING_UNAVAILABLE: &str = "Sharing not available";
