//! Device identity newtype.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::DEVICE_ID_LEN;
use crate::error::{HackshieldError, Result};

/// Pseudonymous identifier for one installation.
///
/// Always exactly [`DEVICE_ID_LEN`] lowercase hexadecimal characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Parses an identity, rejecting anything outside `[0-9a-f]{10}`.
    pub fn parse(value: &str) -> Result<Self> {
        if value.len() != DEVICE_ID_LEN {
            return Err(HackshieldError::Validation(format!(
                "device id must be {} characters, got {}",
                DEVICE_ID_LEN,
                value.len()
            )));
        }
        if !value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(HackshieldError::Validation(
                "device id must be lowercase hexadecimal".into(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Truncates a lowercase hex digest to an identity.
    pub fn from_digest_hex(digest: &str) -> Result<Self> {
        let prefix = digest.get(..DEVICE_ID_LEN).ok_or_else(|| {
            HackshieldError::Validation(format!("digest shorter than {} characters", DEVICE_ID_LEN))
        })?;
        Self::parse(prefix)
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = HackshieldError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = HackshieldError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parse_valid() {
        let id = DeviceId::parse("a1b2c3d4e5").unwrap();
        assert_eq!(id.as_str(), "a1b2c3d4e5");
        assert_eq!(id.to_string(), "a1b2c3d4e5");
    }

    #[test_case("" ; "empty")]
    #[test_case("a1b2c3d4e" ; "too short")]
    #[test_case("a1b2c3d4e5f" ; "too long")]
    #[test_case("A1B2C3D4E5" ; "uppercase")]
    #[test_case("g1b2c3d4e5" ; "non hex")]
    fn test_parse_rejects(value: &str) {
        assert!(DeviceId::parse(value).is_err());
    }

    #[test]
    fn test_from_digest_hex_truncates() {
        let digest = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        let id = DeviceId::from_digest_hex(digest).unwrap();
        assert_eq!(id.as_str(), "e3b0c44298");
        assert!(DeviceId::from_digest_hex("abc").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let id: DeviceId = serde_json::from_str("\"0123456789\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0123456789\"");
        assert!(serde_json::from_str::<DeviceId>("\"nope\"").is_err());
    }
}
