use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use crate::error::{Result, MkvSubError};

fn default_mkvinfo_path() -> String {
    "mkvinfo".to_string()
}

fn default_mkvextract_path() -> String {
    "mkvextract".to_string()
}

fn default_ui_language() -> String {
    "en".to_string()
}

fn default_extension() -> String {
    "srt".to_string()
}

fn default_file_extensions() -> Vec<String> {
    ["mkv", "mka", "mks", "mk3d"].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the mkvinfo binary
    #[serde(default = "default_mkvinfo_path")]
    pub mkvinfo_path: String,
    /// Path to the mkvextract binary
    #[serde(default = "default_mkvextract_path")]
    pub mkvextract_path: String,
    /// Language passed to `mkvinfo --ui-language`. The parser relies on the
    /// English property names, so change this only for a localized build
    /// that still prints them.
    #[serde(default = "default_ui_language")]
    pub ui_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Extra codec ID -> file extension entries, merged over the built-in table
    #[serde(default)]
    pub codec_extensions: BTreeMap<String, String>,
    /// Extension used for codecs missing from the table
    #[serde(default = "default_extension")]
    pub default_extension: String,
    /// File extensions picked up when processing a directory
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mkvinfo_path: default_mkvinfo_path(),
            mkvextract_path: default_mkvextract_path(),
            ui_language: default_ui_language(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            codec_extensions: BTreeMap::new(),
            default_extension: default_extension(),
            file_extensions: default_file_extensions(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MkvSubError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MkvSubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MkvSubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MkvSubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
