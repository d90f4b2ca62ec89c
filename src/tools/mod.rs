// MKVToolNix process layer
//
// - Commands: command line builders for mkvinfo / mkvextract
// - Runner: trait implementation that executes them

pub mod commands;
pub mod runner;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use runner::*;

use crate::config::ToolsConfig;
use crate::error::Result;
use crate::extract::ExtractionRequest;

/// Operations the workflow needs from MKVToolNix
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MkvToolsTrait: Send + Sync {
    /// Run mkvinfo on the file and return its raw standard output
    async fn inspect(&self, source: &Path) -> Result<Vec<u8>>;

    /// Run mkvextract for a single track
    async fn extract_track(&self, source: &Path, request: &ExtractionRequest) -> Result<()>;

    /// Check that both tools can be started
    fn check_availability(&self) -> Result<()>;

    /// First line of `mkvinfo --version`
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating tool runner instances
pub struct MkvToolsFactory;

impl MkvToolsFactory {
    /// Create the default runner that spawns the configured binaries
    pub fn create_tools(config: ToolsConfig) -> Box<dyn MkvToolsTrait> {
        Box::new(runner::MkvToolsImpl::new(config))
    }
}
