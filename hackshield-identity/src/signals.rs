//! Platform fingerprint signals.

use serde::{Deserialize, Serialize};

use hackshield_core::error::{HackshieldError, Result};

/// Browser environment signals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// `navigator.userAgent`
    pub user_agent: String,
    /// `navigator.language`
    pub language: String,
    /// Screen width in CSS pixels
    pub screen_width: u32,
    /// Screen height in CSS pixels
    pub screen_height: u32,
    /// Minutes from local time to UTC (positive west of Greenwich)
    pub timezone_offset_minutes: i32,
}

impl EnvironmentSignals {
    /// Raw fingerprint: all signals concatenated with no separator.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.user_agent,
            self.language,
            self.screen_width,
            self.screen_height,
            self.timezone_offset_minutes
        )
    }
}

/// Native hardware/software identifiers, tried in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSignals {
    /// OS build identifier
    pub os_build_id: Option<String>,
    /// Hardware model identifier
    pub model_id: Option<String>,
    /// Marketing model name
    pub model_name: Option<String>,
}

impl HardwareSignals {
    /// First available identifier: build id, else model id, else model name.
    ///
    /// Only empty strings are skipped. The value is hashed exactly as reported.
    pub fn seed(&self) -> Option<&str> {
        [&self.os_build_id, &self.model_id, &self.model_name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }

    /// Reads identifiers from the host this process runs on.
    pub fn detect() -> Self {
        let read = |path: &str| {
            std::fs::read_to_string(path)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            os_build_id: read("/proc/sys/kernel/osrelease"),
            model_id: read("/etc/machine-id"),
            model_name: Some(format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)),
        }
    }
}

/// Where the identity is being derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Browser-hosted installation.
    Browser(EnvironmentSignals),
    /// Native/installed application.
    Native(HardwareSignals),
}

impl Platform {
    /// Raw fingerprint fed to the hash.
    pub fn fingerprint(&self) -> Result<String> {
        match self {
            Platform::Browser(env) => Ok(env.fingerprint()),
            Platform::Native(hw) => hw.seed().map(str::to_string).ok_or_else(|| {
                HackshieldError::IdentityUnavailable(
                    "no OS build id, model id, or model name available".into(),
                )
            }),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Browser(_) => "browser",
            Platform::Native(_) => "native",
        }
    }
}
