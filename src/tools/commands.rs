use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, MkvSubError};
use crate::extract::ExtractionRequest;

/// External tool invocation (mkvinfo, mkvextract)
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl ToolCommand {
    /// Create a new tool command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a file path argument
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Execute the command and return its standard output.
    ///
    /// MKVToolNix exits with 0 on success, 1 when it finished with warnings
    /// and 2 on error. Warnings are logged and treated as success.
    pub async fn execute(&self) -> Result<Vec<u8>> {
        debug!("Executing tool command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| MkvSubError::Tool(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        match output.status.code() {
            Some(0) => {}
            Some(1) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                warn!(
                    "{} finished with warnings: {}",
                    self.description,
                    last_message(&stdout, &stderr)
                );
            }
            _ => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                return Err(MkvSubError::Tool(format!(
                    "{} failed ({}): {}",
                    self.description,
                    output.status,
                    last_message(&stdout, &stderr)
                )));
            }
        }

        Ok(output.stdout)
    }
}

/// MKVToolNix reports most problems on stdout, so fall back to it when
/// stderr is empty.
fn last_message<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr;
    }
    stdout.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}

/// Builder for mkvinfo / mkvextract command lines
#[derive(Debug, Clone)]
pub struct ToolCommandBuilder {
    mkvinfo_path: String,
    mkvextract_path: String,
    ui_language: String,
}

impl ToolCommandBuilder {
    /// Create a new command builder
    pub fn new<S1, S2, S3>(mkvinfo_path: S1, mkvextract_path: S2, ui_language: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            mkvinfo_path: mkvinfo_path.into(),
            mkvextract_path: mkvextract_path.into(),
            ui_language: ui_language.into(),
        }
    }

    /// Build the inspection command: `mkvinfo --ui-language <lang> <file>`
    pub fn inspect<P: AsRef<Path>>(&self, source: P) -> ToolCommand {
        ToolCommand::new(&self.mkvinfo_path, "Track inspection")
            .arg("--ui-language")
            .arg(&self.ui_language)
            .path(source)
    }

    /// Build the extraction command: `mkvextract tracks <file> <id>:<output>`
    pub fn extract_track<P: AsRef<Path>>(&self, source: P, request: &ExtractionRequest) -> ToolCommand {
        ToolCommand::new(
            &self.mkvextract_path,
            format!("Extraction of track {}", request.track.track_id),
        )
        .arg("tracks")
        .path(source)
        .arg(request.track_spec())
    }

    /// Build version check commands for both tools
    pub fn version_checks(&self) -> [ToolCommand; 2] {
        [
            ToolCommand::new(&self.mkvinfo_path, "mkvinfo version check").arg("--version"),
            ToolCommand::new(&self.mkvextract_path, "mkvextract version check").arg("--version"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::SubtitleTrack;
    use std::path::PathBuf;

    fn builder() -> ToolCommandBuilder {
        ToolCommandBuilder::new("mkvinfo", "/usr/bin/mkvextract", "en")
    }

    #[test]
    fn test_inspect_command() {
        let cmd = builder().inspect("/media/movie.mkv");
        assert_eq!(cmd.binary_path, "mkvinfo");
        assert_eq!(cmd.args, vec!["--ui-language", "en", "/media/movie.mkv"]);
    }

    #[test]
    fn test_extract_command() {
        let request = ExtractionRequest {
            track: SubtitleTrack {
                track_id: "2".to_string(),
                format: "S_TEXT/UTF8".to_string(),
                language: "en".to_string(),
            },
            output_path: PathBuf::from("/media/movie_en.srt"),
        };
        let cmd = builder().extract_track("/media/movie.mkv", &request);

        assert_eq!(cmd.binary_path, "/usr/bin/mkvextract");
        assert_eq!(cmd.args, vec!["tracks", "/media/movie.mkv", "2:/media/movie_en.srt"]);
    }

    #[test]
    fn test_version_checks() {
        let [info, extract] = builder().version_checks();
        assert_eq!(info.args, vec!["--version"]);
        assert_eq!(extract.binary_path, "/usr/bin/mkvextract");
    }

    #[test]
    fn test_last_message() {
        assert_eq!(last_message("ignored\n", "  boom \n"), "boom");
        assert_eq!(last_message("first\nError: not a Matroska file\n\n", ""), "Error: not a Matroska file");
        assert_eq!(last_message("", ""), "");
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_error() {
        let cmd = ToolCommand::new("/nonexistent/mkvinfo-binary", "Track inspection").arg("--version");
        let err = cmd.execute().await.unwrap_err();
        assert!(matches!(err, MkvSubError::Tool(_)));
    }
}
