//! Device identity derivation with optional persistence and memoization.

use std::sync::Arc;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use hackshield_core::constants::DEVICE_ID_STORAGE_KEY;
use hackshield_core::error::Result;
use hackshield_core::traits::KeyValueStore;
use hackshield_core::types::DeviceId;

use crate::signals::{EnvironmentSignals, HardwareSignals, Platform};

/// Lowercase hex SHA-256 of a raw fingerprint.
pub fn fingerprint_digest(fingerprint: &str) -> String {
    hex::encode(Sha256::digest(fingerprint.as_bytes()))
}

/// Hashes a raw fingerprint and truncates it to a [`DeviceId`].
pub fn identity_from_fingerprint(fingerprint: &str) -> DeviceId {
    DeviceId::from_digest_hex(&fingerprint_digest(fingerprint))
        .expect("sha256 hex digest is 64 lowercase hex chars")
}

/// Produces the stable pseudonymous identity for this installation.
///
/// With a store attached, the first derived identity is persisted under
/// [`DEVICE_ID_STORAGE_KEY`] and returned unchanged afterwards, so volatile
/// signals never change it. Without a store the identity is re-derived from
/// the signals. Either way the result is memoized per deriver.
pub struct DeviceIdentityDeriver {
    platform: Platform,
    store: Option<Arc<dyn KeyValueStore>>,
    cached: RwLock<Option<DeviceId>>,
}

impl DeviceIdentityDeriver {
    /// Creates a deriver for the given platform with no persistence.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            store: None,
            cached: RwLock::new(None),
        }
    }

    /// Browser deriver persisting to the given store.
    pub fn browser(signals: EnvironmentSignals, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(Platform::Browser(signals)).with_store(store)
    }

    /// Native deriver re-deriving from hardware signals on every cold start.
    pub fn native(signals: HardwareSignals) -> Self {
        Self::new(Platform::Native(signals))
    }

    /// Attaches persistent storage.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The platform this deriver reads signals from.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Returns the identity, deriving and persisting it on first use.
    pub fn derive(&self) -> Result<DeviceId> {
        if let Some(id) = self.cached.read().as_ref() {
            return Ok(id.clone());
        }

        let mut cached = self.cached.write();
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let id = match self.load_stored()? {
            Some(id) => id,
            None => {
                let id = identity_from_fingerprint(&self.platform.fingerprint()?);
                if let Some(store) = &self.store {
                    store.set(DEVICE_ID_STORAGE_KEY, id.as_str())?;
                }
                debug!(platform = self.platform.label(), device_id = %id, "Derived device identity");
                id
            }
        };

        *cached = Some(id.clone());
        Ok(id)
    }

    fn load_stored(&self) -> Result<Option<DeviceId>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        match store.get(DEVICE_ID_STORAGE_KEY)? {
            Some(raw) => match DeviceId::parse(&raw) {
                Ok(id) => Ok(Some(id)),
                Err(e) => {
                    warn!(error = %e, "Stored device identity is malformed, re-deriving");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}
