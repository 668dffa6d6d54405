//! # HackShield Storage
//!
//! Local persistence and platform-capability implementations:
//!
//! - **Key-value stores**: [`MemoryStore`] for tests, [`FileStore`] for a
//!   persisted device identity
//! - **Artifact sinks**: [`MediaLibrarySink`] writes the returned image to
//!   durable storage and registers it with a media catalog;
//!   [`DownloadSink`] hands it over as a client-side download
//! - **Catalog & prompts**: [`DirectoryCatalog`], [`StaticPermission`], [`PathImagePicker`]
//!
//! ## Example
//!
//! ```rust
//! use hackshield_core::traits::KeyValueStore;
//! use hackshield_storage::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.set("web_device_id", "a1b2c3d4e5").unwrap();
//! assert_eq!(store.get("web_device_id").unwrap().as_deref(), Some("a1b2c3d4e5"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod media;
mod memory;
mod platform;

pub use file::FileStore;
pub use media::{artifact_file_name, DirectoryCatalog, DownloadSink, MediaLibrarySink};
pub use memory::MemoryStore;
pub use platform::{PathImagePicker, StaticPermission};
