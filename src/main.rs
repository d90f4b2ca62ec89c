//! mkvsub - Subtitle extraction for Matroska files
//!
//! Entry point for the command line tool: lists and extracts subtitle tracks
//! using mkvinfo and mkvextract from MKVToolNix.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use mkvsub::cli::{Args, Commands};
use mkvsub::config::Config;
use mkvsub::error::MkvSubError;
use mkvsub::workflow::{TrackSelection, Workflow};

const DEFAULT_CONFIG_FILE: &str = "mkvsub.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load mkvsub.toml from current directory first
            if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::List { input, json } => {
            let workflow = create_workflow(config).await?;
            let tracks = workflow.list_subtitles(&input).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
            } else if tracks.is_empty() {
                println!("No subtitle tracks found.");
            } else {
                for track in &tracks {
                    println!("{}", track);
                }
            }
        }
        Commands::Extract { input, tracks, languages, output_dir } => {
            info!("Extracting subtitles from: {}", input.display());
            let workflow = create_workflow(config).await?;

            let selection = TrackSelection::from_lists(tracks.as_deref(), languages.as_deref());
            let summary = workflow.extract_subtitles(&input, &selection, output_dir.as_ref()).await?;

            for path in &summary.extracted {
                println!("{}", path.display());
            }
            if !summary.failed.is_empty() {
                for (track_id, error) in &summary.failed {
                    eprintln!("Track {}: {}", track_id, error);
                }
                return Err(MkvSubError::Extraction(format!(
                    "{} of {} tracks failed",
                    summary.failed.len(),
                    summary.failed.len() + summary.extracted.len()
                ))
                .into());
            }
        }
        Commands::Batch { input_dir, languages, output_dir } => {
            info!("Processing directory: {}", input_dir.display());
            let workflow = create_workflow(config).await?;

            let selection = TrackSelection::from_lists(None, languages.as_deref());
            let summary = workflow
                .process_directory(&input_dir, &selection, output_dir.as_ref())
                .await?;

            println!(
                "Processed {} files, extracted {} subtitle tracks",
                summary.files, summary.extracted
            );
            for path in &summary.failed_files {
                warn!("Incomplete: {}", path.display());
            }
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            println!("Configuration written to {}", output.display());
        }
    }

    info!("mkvsub completed successfully");
    Ok(())
}

/// Create the workflow, failing early when MKVToolNix is missing
async fn create_workflow(config: Config) -> Result<Workflow> {
    let workflow = Workflow::new(config)?;
    info!("Using {}", workflow.version_info().await?);
    Ok(workflow)
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".mkvsub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "mkvsub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so that `list --json` stays parseable
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("mkvsub.log").display()
    );

    Ok(())
}
