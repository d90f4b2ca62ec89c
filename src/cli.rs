use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the subtitle tracks of a Matroska file
    List {
        /// Input Matroska file
        #[arg(short, long)]
        input: PathBuf,

        /// Print the tracks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract subtitle tracks from a Matroska file
    Extract {
        /// Input Matroska file
        #[arg(short, long)]
        input: PathBuf,

        /// Track IDs to extract (comma-separated, default: all)
        #[arg(short, long)]
        tracks: Option<String>,

        /// Languages to extract (comma-separated, default: all)
        #[arg(short, long)]
        languages: Option<String>,

        /// Output directory (default: next to the input file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Extract subtitle tracks from every Matroska file in a directory
    Batch {
        /// Input directory containing Matroska files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Languages to extract (comma-separated, default: all)
        #[arg(short, long)]
        languages: Option<String>,

        /// Output directory (default: next to each input file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "mkvsub.toml")]
        output: PathBuf,
    },
}
