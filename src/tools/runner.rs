use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{info, debug};

use crate::config::ToolsConfig;
use crate::error::{Result, MkvSubError};
use crate::extract::ExtractionRequest;
use super::{MkvToolsTrait, ToolCommandBuilder};

/// Tool runner that spawns the configured MKVToolNix binaries
pub struct MkvToolsImpl {
    config: ToolsConfig,
    command_builder: ToolCommandBuilder,
}

impl MkvToolsImpl {
    /// Create a new tool runner
    pub fn new(config: ToolsConfig) -> Self {
        let command_builder = ToolCommandBuilder::new(
            &config.mkvinfo_path,
            &config.mkvextract_path,
            &config.ui_language,
        );

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MkvToolsTrait for MkvToolsImpl {
    async fn inspect(&self, source: &Path) -> Result<Vec<u8>> {
        info!("Inspecting tracks of {}", source.display());

        self.command_builder.inspect(source).execute().await
    }

    async fn extract_track(&self, source: &Path, request: &ExtractionRequest) -> Result<()> {
        info!(
            "Extracting track {} ({}, {}) -> {}",
            request.track.track_id,
            request.track.format,
            request.track.language,
            request.output_path.display()
        );

        self.command_builder
            .extract_track(source, request)
            .execute()
            .await
            .map_err(|e| MkvSubError::Extraction(e.to_string()))?;

        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        for command in self.command_builder.version_checks() {
            let output = Command::new(&command.binary_path)
                .args(&command.args)
                .output()
                .map_err(|e| MkvSubError::Tool(format!("{} not found: {}", command.binary_path, e)))?;

            if !output.status.success() {
                return Err(MkvSubError::Tool(format!(
                    "{} failed for {}",
                    command.description, command.binary_path
                )));
            }
        }

        info!(
            "MKVToolNix is available ({}, {})",
            self.config.mkvinfo_path, self.config.mkvextract_path
        );
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting mkvinfo version information");

        let [mkvinfo, _] = self.command_builder.version_checks();
        let stdout = mkvinfo.execute().await?;
        let version_info = String::from_utf8_lossy(&stdout);

        // Extract the first line which contains the version
        let first_line = version_info.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}
