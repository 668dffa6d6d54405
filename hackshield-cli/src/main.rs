//! HackShield CLI
//!
//! Terminal host for the three HackShield screens: embed a secret, recover a
//! secret, browse the block ledger.

mod terminal;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zeroize::Zeroizing;

use hackshield_client::{BlockSubmissionClient, BlockVerificationClient, HttpBlockService, ServiceConfig};
use hackshield_core::error::HackshieldError;
use hackshield_core::traits::{ArtifactSink, ImagePicker, PermissionPrompt};
use hackshield_core::types::{ArtifactRef, DeviceId, ImageRef};
use hackshield_identity::{DeviceIdentityDeriver, HardwareSignals};
use hackshield_ledger::{BlockCard, BlockLedgerPoller, FetchOutcome, LedgerView};
use hackshield_storage::{DirectoryCatalog, DownloadSink, FileStore, MediaLibrarySink, PathImagePicker, StaticPermission};

use crate::terminal::{terminal_signals, ConfirmPermission, PrintShareSheet};

/// HackShield - hide a secret in an image, bound to a device
#[derive(Parser)]
#[command(name = "hackshield")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Block Service base URL
    #[arg(long, global = true, env = "HACKSHIELD_API_URL")]
    api_url: Option<String>,

    /// Directory for the device identity and saved artifacts
    #[arg(long, global = true, env = "HACKSHIELD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Which platform behavior to emulate
    #[arg(long, global = true, value_enum, default_value_t = PlatformArg::Native)]
    platform: PlatformArg,

    /// Grant media permissions without prompting
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PlatformArg {
    /// Save artifacts to the media library
    Native,
    /// Hand artifacts over as downloads
    Web,
}

#[derive(Subcommand)]
enum Commands {
    /// Show this device's identity
    Id,

    /// Embed a secret into an image
    Encode {
        /// Image to embed into
        image: PathBuf,
        /// Intended recipient
        #[arg(short, long)]
        to: String,
        /// Secret to embed (prompted for if omitted)
        #[arg(short, long)]
        secret: Option<String>,
        /// Offer the saved image to the share sheet
        #[arg(long)]
        share: bool,
    },

    /// Recover the secret embedded in an image
    Decode {
        /// Image to decode
        image: PathBuf,
    },

    /// List the block ledger
    Blocks {
        /// Keep polling until Ctrl+C
        #[arg(short, long)]
        watch: bool,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "hackshield=debug,info"
    } else {
        "hackshield=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = App::new(&cli)?;

    match cli.command {
        Commands::Id => cmd_id(&app),
        Commands::Encode {
            image,
            to,
            secret,
            share,
        } => cmd_encode(&app, &image, &to, secret, share).await,
        Commands::Decode { image } => cmd_decode(&app, &image).await,
        Commands::Blocks { watch, json } => cmd_blocks(&app, watch, json).await,
    }
}

/// Everything the commands share.
struct App {
    platform: PlatformArg,
    data_dir: PathBuf,
    config: ServiceConfig,
    deriver: DeviceIdentityDeriver,
    permission: Arc<dyn PermissionPrompt>,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .context("No local data directory on this platform; pass --data-dir")?
                .join("hackshield"),
        };

        let mut config = ServiceConfig::from_env();
        if let Some(url) = &cli.api_url {
            config.base_url = url.clone();
        }

        let store = Arc::new(
            FileStore::open(data_dir.join("identity.json")).context("Failed to open identity store")?,
        );
        let deriver = match cli.platform {
            PlatformArg::Native => DeviceIdentityDeriver::native(HardwareSignals::detect()).with_store(store),
            PlatformArg::Web => DeviceIdentityDeriver::browser(terminal_signals(), store),
        };

        let permission: Arc<dyn PermissionPrompt> = if cli.yes {
            Arc::new(StaticPermission::granted())
        } else {
            Arc::new(ConfirmPermission::default())
        };

        Ok(Self {
            platform: cli.platform,
            data_dir,
            config,
            deriver,
            permission,
        })
    }

    fn device_id(&self) -> Result<DeviceId> {
        self.deriver.derive().map_err(user_error)
    }

    fn service(&self) -> Result<Arc<HttpBlockService>> {
        let service = HttpBlockService::with_config(self.config.clone()).map_err(user_error)?;
        Ok(Arc::new(service))
    }

    fn sink(&self) -> Arc<dyn ArtifactSink> {
        match self.platform {
            PlatformArg::Native => {
                let library = dirs::picture_dir()
                    .map(|dir| dir.join("HackShield"))
                    .unwrap_or_else(|| self.data_dir.join("library"));
                Arc::new(MediaLibrarySink::new(
                    self.data_dir.join("documents"),
                    Arc::clone(&self.permission),
                    Arc::new(DirectoryCatalog::new(library)),
                ))
            }
            PlatformArg::Web => {
                let downloads = dirs::download_dir().unwrap_or_else(|| self.data_dir.join("downloads"));
                Arc::new(DownloadSink::with_download_dir(downloads))
            }
        }
    }

    async fn pick(&self, path: &Path) -> Result<ImageRef> {
        let picker = PathImagePicker::new(Some(path.to_path_buf()), Arc::clone(&self.permission));
        picker
            .pick()
            .await
            .map_err(user_error)?
            .context("No image selected")
    }
}

/// Surfaces the message the user should see.
fn user_error(e: HackshieldError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Show this device's identity
fn cmd_id(app: &App) -> Result<()> {
    let id = app.device_id()?;

    println!("{} {}", "🆔 Device ID:".cyan().bold(), id);
    println!("   {} {}", "Platform:".dimmed(), app.deriver.platform().label());
    println!("   {} {}", "Data dir:".dimmed(), app.data_dir.display());

    Ok(())
}

/// Embed a secret into an image
async fn cmd_encode(
    app: &App,
    image: &Path,
    recipient: &str,
    secret: Option<String>,
    share: bool,
) -> Result<()> {
    println!("{} {}", "🔐 Encoding a block for:".cyan().bold(), recipient);

    let secret = Zeroizing::new(match secret {
        Some(secret) => secret,
        None => Password::new().with_prompt("Secret").interact()?,
    });

    let device_id = app.device_id()?;
    let image = app.pick(image).await?;

    let mut client = BlockSubmissionClient::new(app.service()?, app.sink());
    if share {
        client = client.with_share_sheet(Arc::new(PrintShareSheet));
    }

    let pb = spinner("Processing...")?;
    let result = client.submit(Some(image), recipient, &secret, &device_id).await;
    pb.finish_and_clear();

    let submitted = result.map_err(user_error)?;

    match &submitted.artifact {
        ArtifactRef::Saved { path, .. } => {
            println!("\n{}", "✅ Encoded image saved to gallery.".green().bold());
            println!("   {} {}", "Path:".dimmed(), path.display());
        }
        ArtifactRef::Download { file_name, .. } => {
            println!("\n{}", "✅ Encoded image downloaded.".green().bold());
            println!("   {} {}", "File:".dimmed(), file_name);
        }
    }
    println!("   {} {}", "Device:".dimmed(), device_id);

    if share {
        if let Some(message) = client.share(&submitted.artifact).await.map_err(user_error)?.message() {
            println!("{}", format!("⚠️  {}", message).yellow());
        }
    }

    Ok(())
}

/// Recover the secret embedded in an image
async fn cmd_decode(app: &App, image: &Path) -> Result<()> {
    println!("{} {}", "🔓 Decoding:".cyan().bold(), image.display());

    let device_id = app.device_id()?;
    let image = app.pick(image).await?;
    let client = BlockVerificationClient::new(app.service()?);

    let pb = spinner("Processing...")?;
    let result = client.verify(Some(image), &device_id).await;
    pb.finish_and_clear();

    let verified = result.map_err(user_error)?;
    println!("\n{}", "✅ Decoded".green().bold());
    println!("   {}", verified.message());

    Ok(())
}

/// List the block ledger
async fn cmd_blocks(app: &App, watch: bool, json: bool) -> Result<()> {
    let poller = BlockLedgerPoller::with_interval(app.service()?, app.config.poll_interval());

    if !watch {
        let pb = spinner("Fetching blocks...")?;
        let outcome = poller.refresh_now().await;
        pb.finish_and_clear();

        return match outcome {
            FetchOutcome::Applied(_) => render(&poller.view(), json),
            FetchOutcome::Failed(e) => Err(user_error(e)),
            FetchOutcome::Discarded => anyhow::bail!("Ledger fetch was superseded"),
        };
    }

    println!("{}", "⛓️  Watching the ledger (Ctrl+C to stop)".cyan().bold());

    let mut rx = poller.subscribe();
    poller.start();

    let mut shown_sequence = 0;
    let mut shown_error: Option<String> = None;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = rx.borrow_and_update().clone();
                if view.last_applied_sequence != shown_sequence {
                    shown_sequence = view.last_applied_sequence;
                    render(&view, json)?;
                }
                if view.last_error != shown_error {
                    if let Some(error) = &view.last_error {
                        println!("{}", format!("❌ {}", error).red());
                    }
                    shown_error = view.last_error;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    Ok(())
}

fn render(view: &LedgerView, json: bool) -> Result<()> {
    let cards = view.cards();

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    println!(
        "\n{} {} block(s), {}",
        "⛓️  Ledger:".green().bold(),
        cards.len(),
        chrono::Local::now().format("%H:%M:%S")
    );
    if cards.is_empty() {
        println!("   {}", "No blocks yet.".yellow());
    }
    for card in &cards {
        print_card(card);
    }

    Ok(())
}

fn print_card(card: &BlockCard) {
    println!("\n   {}  {}", card.title().bold(), "✅ Valid".green());
    println!("      {} {}", "Hash:".dimmed(), card.hash_preview);
    println!("      {} {}", "Device:".dimmed(), card.device_id);
    println!("      {} {}", "Recipient:".dimmed(), card.recipient);
    println!("      {} {}", "Date:".dimmed(), card.date);
}
