//! Terminal stand-ins for the platform capabilities.

use std::io;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{Local, Offset};
use colored::*;
use dialoguer::Confirm;

use hackshield_core::error::Result;
use hackshield_core::traits::{PermissionPrompt, PermissionStatus, ShareSheet};
use hackshield_core::types::ArtifactRef;
use hackshield_identity::EnvironmentSignals;

/// Asks for media access with a yes/no prompt, once per process.
#[derive(Default)]
pub struct ConfirmPermission {
    answer: OnceLock<PermissionStatus>,
}

#[async_trait]
impl PermissionPrompt for ConfirmPermission {
    async fn request_media_access(&self) -> Result<PermissionStatus> {
        if let Some(status) = self.answer.get() {
            return Ok(*status);
        }

        let granted = tokio::task::spawn_blocking(|| {
            Confirm::new()
                .with_prompt("Allow HackShield to access your media library?")
                .default(true)
                .interact()
        })
        .await
        .map_err(io::Error::other)?
        .map_err(|dialoguer::Error::IO(e)| e)?;

        let status = if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        Ok(*self.answer.get_or_init(|| status))
    }
}

/// "Shares" a saved artifact by printing its location.
pub struct PrintShareSheet;

#[async_trait]
impl ShareSheet for PrintShareSheet {
    async fn is_available(&self) -> bool {
        true
    }

    async fn share(&self, artifact: &ArtifactRef) -> Result<()> {
        println!("   {} file://{}", "Share:".dimmed(), artifact);
        Ok(())
    }
}

/// Browser-style signals for a terminal session.
///
/// The terminal size stands in for the screen size, `LANG` for the language.
pub fn terminal_signals() -> EnvironmentSignals {
    let env_u32 = |key: &str| {
        std::env::var(key)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    };

    EnvironmentSignals {
        user_agent: format!(
            "hackshield-cli/{} ({}; {})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
        language: language_tag(std::env::var("LANG").ok().as_deref()),
        screen_width: env_u32("COLUMNS"),
        screen_height: env_u32("LINES"),
        timezone_offset_minutes: timezone_offset_minutes(
            Local::now().offset().fix().local_minus_utc(),
        ),
    }
}

/// `en_US.UTF-8` -> `en-US`. Falls back to `en-US`.
fn language_tag(lang: Option<&str>) -> String {
    lang.and_then(|l| l.split('.').next())
        .filter(|l| !l.is_empty() && *l != "C" && *l != "POSIX")
        .map(|l| l.replace('_', "-"))
        .unwrap_or_else(|| "en-US".to_string())
}

/// Minutes from local time to UTC, positive west of Greenwich.
fn timezone_offset_minutes(local_minus_utc_secs: i32) -> i32 {
    -local_minus_utc_secs / 60
}
