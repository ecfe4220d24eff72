//! journeybook - image gallery with description search
//!
//! Command-line front end over the gallery core: scan, watch, import,
//! search and generate.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use journeybook_common::config::{
    default_config_path, resolve_root_folder, write_toml_config, TomlConfig,
};
use journeybook_common::events::GalleryEvent;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use journeybook_gallery::config::resolve_settings;
use journeybook_gallery::models::{DescriptionOutcome, IngestStatus};
use journeybook_gallery::services::{ChangeResult, PathListPicker, SearchMode, DEFAULT_POLL_INTERVAL};
use journeybook_gallery::Gallery;

/// Command-line arguments for journeybook
#[derive(Parser, Debug)]
#[command(name = "journeybook")]
#[command(about = "Local image gallery with AI description search")]
#[command(version)]
struct Args {
    /// Application root folder (holds img/ and search/)
    #[arg(short, long, env = "JOURNEYBOOK_ROOT", global = true)]
    root: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the image directory once and list its images
    Scan,
    /// Keep polling and log every change until Ctrl+C
    Watch {
        /// Poll period in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        interval_ms: u64,
    },
    /// Copy images into the library, describing them if the API is configured
    Import {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Search by file name or by stored description
    Search {
        #[arg(short, long, default_value = "filename")]
        mode: SearchMode,
        #[arg(default_value = "")]
        query: String,
    },
    /// Generate an image from a prompt and add it to the library
    Generate {
        #[arg(default_value = "")]
        prompt: String,
    },
    /// List description artifact keys
    Keys,
    /// Write the effective config to the config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let toml_config = match &config_path {
        Some(path) => TomlConfig::load(path).context("Failed to load config")?,
        None => TomlConfig::default(),
    };

    let level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "journeybook={0},journeybook_gallery={0},journeybook_common={0}",
                    level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "journeybook {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    let root = resolve_root_folder(args.root.as_deref(), &toml_config);
    info!("Root folder: {}", root.display());

    let settings = resolve_settings(&toml_config);
    let gallery = Gallery::from_settings(&root, &settings)
        .context("Failed to initialize generation clients")?;

    match args.command {
        Command::Scan => {
            gallery.poll().await;
            for name in gallery.current_images().await {
                println!("{}", name);
            }
        }
        Command::Watch { interval_ms } => watch(&gallery, interval_ms).await?,
        Command::Import { paths } => {
            if !gallery.describes_on_import() {
                info!("Generation API not configured, images will not be described");
            }
            let picker = PathListPicker::new(paths);
            let outcomes = gallery.import_with_picker(&picker).await.unwrap_or_default();
            let mut failed = false;

            for outcome in &outcomes {
                let name = outcome
                    .file_name
                    .clone()
                    .unwrap_or_else(|| outcome.source.display().to_string());
                match &outcome.status {
                    IngestStatus::Copied { description } => match description {
                        DescriptionOutcome::Stored(key) => println!("imported {} (description: {})", name, key),
                        DescriptionOutcome::Skipped => println!("imported {}", name),
                        DescriptionOutcome::Failed(e) => {
                            println!("imported {} (description failed: {})", name, e)
                        }
                    },
                    IngestStatus::Failed { error } => {
                        failed = true;
                        eprintln!("failed {}: {}", name, error);
                    }
                }
            }

            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Search { mode, query } => {
            gallery.poll().await;
            for name in gallery.search(mode, &query).await {
                println!("{}", name);
            }
        }
        Command::Generate { prompt } => {
            let file_name = gallery
                .generate_image(&prompt)
                .await
                .context("Failed to get image from API")?;
            println!("{}", file_name);
        }
        Command::Keys => {
            for key in gallery.store().list_keys().context("Failed to list descriptions")? {
                println!("{}", key);
            }
        }
        Command::InitConfig { force } => {
            let Some(path) = config_path else {
                bail!("No config directory available, pass --config");
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }

            let config = TomlConfig {
                root_folder: Some(root.clone()),
                ..toml_config
            };
            write_toml_config(&config, &path).context("Failed to write config")?;
            println!("{}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Run the poll loop until Ctrl+C, printing each new image set
async fn watch(gallery: &Gallery, interval_ms: u64) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut events = gallery.event_bus().subscribe();

    if let ChangeResult::Updated(images) = gallery.poll().await {
        println!("{} image(s)", images.len());
    }

    let handle = gallery
        .poll_loop()
        .spawn(Duration::from_millis(interval_ms.max(1)), cancel.clone());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping");
                break;
            }
            event = events.recv() => match event {
                Ok(GalleryEvent::ImageSetChanged { images, .. }) => {
                    println!("{} image(s): {}", images.len(), images.join(", "));
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Missed {} gallery events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    cancel.cancel();
    let stats = handle.await.context("Poll loop task failed")?;
    info!(ticks = stats.ticks, changes = stats.changes, "Watch finished");
    Ok(())
}
