use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, MkvSubError};
use crate::extract::{build_requests, ExtensionMap, ExtractionRequest};
use crate::tools::{MkvToolsFactory, MkvToolsTrait};
use crate::tracks::{subtitle_tracks, SubtitleTrack};
use crate::tree::MetadataTree;

/// Which subtitle tracks to extract. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelection {
    pub track_ids: Vec<String>,
    pub languages: Vec<String>,
}

impl TrackSelection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a selection from comma-separated CLI lists.
    pub fn from_lists(track_ids: Option<&str>, languages: Option<&str>) -> Self {
        fn split(list: Option<&str>) -> Vec<String> {
            list.map(|l| {
                l.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
        }

        Self {
            track_ids: split(track_ids),
            languages: split(languages),
        }
    }

    pub fn matches(&self, track: &SubtitleTrack) -> bool {
        (self.track_ids.is_empty() || self.track_ids.contains(&track.track_id))
            && (self.languages.is_empty() || self.languages.contains(&track.language))
    }
}

/// Outcome of extracting the subtitles of one file
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub extracted: Vec<PathBuf>,
    /// Track ID and error message of every track that could not be extracted
    pub failed: Vec<(String, String)>,
}

/// Outcome of processing a directory
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub files: usize,
    pub extracted: usize,
    pub failed_files: Vec<PathBuf>,
}

pub struct Workflow {
    config: Config,
    tools: Box<dyn MkvToolsTrait>,
    extensions: ExtensionMap,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let tools = MkvToolsFactory::create_tools(config.tools.clone());

        // Check dependencies
        tools.check_availability()?;

        Ok(Self::with_tools(config, tools))
    }

    pub fn with_tools(config: Config, tools: Box<dyn MkvToolsTrait>) -> Self {
        let extensions = ExtensionMap::from_config(&config.extract);
        Self {
            config,
            tools,
            extensions,
        }
    }

    /// Version line of the installed mkvinfo
    pub async fn version_info(&self) -> Result<String> {
        self.tools.get_version_info().await
    }

    /// List the extractable subtitle tracks of a Matroska file
    pub async fn list_subtitles<P: AsRef<Path>>(&self, input_path: P) -> Result<Vec<SubtitleTrack>> {
        let input_path = input_path.as_ref();

        if !input_path.exists() {
            return Err(MkvSubError::FileNotFound(input_path.display().to_string()));
        }

        let output = self.tools.inspect(input_path).await?;
        let tree = MetadataTree::parse_bytes(&output);
        let tracks = subtitle_tracks(&tree);

        info!("Found {} subtitle tracks in {}", tracks.len(), input_path.display());
        Ok(tracks)
    }

    /// Extract the selected subtitle tracks of a file next to it, or into
    /// `output_dir` when given
    pub async fn extract_subtitles<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        selection: &TrackSelection,
        output_dir: Option<Q>,
    ) -> Result<ExtractionSummary> {
        let input_path = input_path.as_ref();
        let output_dir: Option<&Path> = output_dir.as_ref().map(|d| d.as_ref());

        let tracks: Vec<_> = self
            .list_subtitles(input_path)
            .await?
            .into_iter()
            .filter(|track| selection.matches(track))
            .collect();

        if tracks.is_empty() {
            info!("No matching subtitle tracks in {}", input_path.display());
            return Ok(ExtractionSummary::default());
        }

        // Create output directory if it doesn't exist
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).await?;
        }

        let requests: Vec<ExtractionRequest> = build_requests(input_path, &tracks, &self.extensions)
            .into_iter()
            .map(|request| match output_dir {
                Some(dir) => request.relocate(dir),
                None => request,
            })
            .collect();
        warn_on_shared_outputs(&requests);

        let mut summary = ExtractionSummary::default();
        for request in &requests {
            match self.tools.extract_track(input_path, request).await {
                Ok(()) => summary.extracted.push(request.output_path.clone()),
                Err(e) => {
                    warn!("Failed to extract track {}: {}", request.track.track_id, e);
                    summary.failed.push((request.track.track_id.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Extracted {} of {} subtitle tracks from {}",
            summary.extracted.len(),
            requests.len(),
            input_path.display()
        );
        Ok(summary)
    }

    /// Extract subtitles from every Matroska file below a directory
    pub async fn process_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        selection: &TrackSelection,
        output_dir: Option<Q>,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        let output_dir: Option<&Path> = output_dir.as_ref().map(|d| d.as_ref());
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(MkvSubError::Config("Input path is not a directory".to_string()));
        }

        let files = self.find_media_files(input_dir);
        info!("Found {} Matroska files to process", files.len());

        let progress = ProgressBar::new(files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| MkvSubError::Config(format!("Invalid progress template: {}", e)))?
                .progress_chars("#>-"),
        );

        let mut summary = BatchSummary {
            files: files.len(),
            ..BatchSummary::default()
        };

        for path in files {
            progress.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );

            let target_dir = output_dir.map(|dir| mirrored_output_dir(dir, input_dir, &path));
            match self.extract_subtitles(&path, selection, target_dir.as_deref()).await {
                Ok(result) => {
                    summary.extracted += result.extracted.len();
                    if result.failed.is_empty() {
                        info!("Successfully processed: {}", path.display());
                    } else {
                        warn!("{} tracks failed in {}", result.failed.len(), path.display());
                        summary.failed_files.push(path);
                    }
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", path.display(), e);
                    summary.failed_files.push(path);
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(summary)
    }

    fn find_media_files(&self, input_dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        self.config
                            .extract
                            .file_extensions
                            .iter()
                            .any(|wanted| wanted.eq_ignore_ascii_case(ext))
                    })
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();

        files.sort();
        files
    }
}

/// Output directory for `file` that keeps its location relative to
/// `input_dir`, so same-named files from different folders stay apart.
fn mirrored_output_dir(output_dir: &Path, input_dir: &Path, file: &Path) -> PathBuf {
    match file.parent().and_then(|parent| parent.strip_prefix(input_dir).ok()) {
        Some(relative) if !relative.as_os_str().is_empty() => output_dir.join(relative),
        _ => output_dir.to_path_buf(),
    }
}

/// Two tracks with the same language and extension map to the same file;
/// the later extraction overwrites the earlier one.
fn warn_on_shared_outputs(requests: &[ExtractionRequest]) {
    let mut seen = HashSet::new();
    for request in requests {
        if !seen.insert(&request.output_path) {
            warn!(
                "Track {} writes to {} which is already used by another track",
                request.track.track_id,
                request.output_path.display()
            );
        }
    }
}
