//! Output naming for extracted subtitle tracks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::ExtractConfig;
use crate::tracks::SubtitleTrack;

/// Codec ID -> file extension table. Built once from configuration and
/// shared by reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    extensions: HashMap<String, String>,
    fallback: String,
}

impl Default for ExtensionMap {
    fn default() -> Self {
        let extensions = [
            ("S_TEXT/UTF8", "srt"),
            ("S_TEXT/ASS", "ass"),
            ("S_TEXT/SSA", "ssa"),
        ]
        .into_iter()
        .map(|(codec, ext)| (codec.to_string(), ext.to_string()))
        .collect();

        Self {
            extensions,
            fallback: "srt".to_string(),
        }
    }
}

impl ExtensionMap {
    /// Built-in table with the configured entries merged on top.
    pub fn from_config(config: &ExtractConfig) -> Self {
        let mut map = Self::default();
        for (codec, ext) in &config.codec_extensions {
            map.extensions
                .insert(codec.clone(), ext.trim_start_matches('.').to_string());
        }
        map.fallback = config.default_extension.trim_start_matches('.').to_string();
        map
    }

    pub fn extension_for(&self, format: &str) -> &str {
        self.extensions
            .get(format)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// One mkvextract job: which track goes to which file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub track: SubtitleTrack,
    pub output_path: PathBuf,
}

impl ExtractionRequest {
    pub fn new(source: &Path, track: SubtitleTrack, extensions: &ExtensionMap) -> Self {
        let output_path = build_output_path(source, &track, extensions);
        Self { track, output_path }
    }

    /// Move the output file into `dir`, keeping its file name.
    pub fn relocate(mut self, dir: &Path) -> Self {
        if let Some(file_name) = self.output_path.file_name() {
            self.output_path = dir.join(file_name);
        }
        self
    }

    /// The `<trackId>:<outputPath>` argument mkvextract expects.
    pub fn track_spec(&self) -> String {
        format!("{}:{}", self.track.track_id, self.output_path.display())
    }
}

/// `<source without final extension>_<language>.<ext>`, e.g.
/// `movie.mkv` + Japanese ASS track -> `movie_ja.ass`.
pub fn build_output_path(source: &Path, track: &SubtitleTrack, extensions: &ExtensionMap) -> PathBuf {
    let base = match source.extension() {
        Some(_) => source.with_extension(""),
        None => source.to_path_buf(),
    };

    let mut file = base.into_os_string();
    file.push(format!(
        "_{}.{}",
        track.language,
        extensions.extension_for(&track.format)
    ));
    PathBuf::from(file)
}

pub fn build_requests(
    source: &Path,
    tracks: &[SubtitleTrack],
    extensions: &ExtensionMap,
) -> Vec<ExtractionRequest> {
    tracks
        .iter()
        .map(|track| ExtractionRequest::new(source, track.clone(), extensions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn track(id: &str, format: &str, language: &str) -> SubtitleTrack {
        SubtitleTrack {
            track_id: id.to_string(),
            format: format.to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn test_default_extensions() {
        let map = ExtensionMap::default();
        assert_eq!(map.extension_for("S_TEXT/UTF8"), "srt");
        assert_eq!(map.extension_for("S_TEXT/ASS"), "ass");
        assert_eq!(map.extension_for("S_TEXT/SSA"), "ssa");
        assert_eq!(map.extension_for("S_HDMV/PGS"), "srt");
        assert_eq!(map.extension_for(""), "srt");
    }

    #[test]
    fn test_configured_extensions() {
        let config = ExtractConfig {
            codec_extensions: BTreeMap::from([
                ("S_HDMV/PGS".to_string(), "sup".to_string()),
                ("S_TEXT/SSA".to_string(), ".ass".to_string()),
            ]),
            default_extension: "txt".to_string(),
            ..ExtractConfig::default()
        };
        let map = ExtensionMap::from_config(&config);

        assert_eq!(map.extension_for("S_HDMV/PGS"), "sup");
        assert_eq!(map.extension_for("S_TEXT/SSA"), "ass");
        assert_eq!(map.extension_for("S_TEXT/UTF8"), "srt");
        assert_eq!(map.extension_for("S_VOBSUB"), "txt");
    }

    #[test]
    fn test_output_path() {
        let map = ExtensionMap::default();
        assert_eq!(
            build_output_path(Path::new("movie.mkv"), &track("2", "S_TEXT/ASS", "ja"), &map),
            PathBuf::from("movie_ja.ass")
        );
        assert_eq!(
            build_output_path(Path::new("movie.mkv"), &track("2", "S_HDMV/PGS", "en"), &map),
            PathBuf::from("movie_en.srt")
        );
    }

    #[test]
    fn test_output_path_keeps_directories_and_inner_dots() {
        let map = ExtensionMap::default();
        assert_eq!(
            build_output_path(
                Path::new("/media/show.s01e01.mkv"),
                &track("3", "S_TEXT/UTF8", "und"),
                &map
            ),
            PathBuf::from("/media/show.s01e01_und.srt")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        let map = ExtensionMap::default();
        assert_eq!(
            build_output_path(Path::new("/media/v1.0/movie"), &track("1", "S_TEXT/SSA", "de"), &map),
            PathBuf::from("/media/v1.0/movie_de.ssa")
        );
    }

    #[test]
    fn test_track_spec_and_relocate() {
        let map = ExtensionMap::default();
        let request = ExtractionRequest::new(Path::new("movie.mkv"), track("3", "S_TEXT/UTF8", "en"), &map);
        assert_eq!(request.track_spec(), "3:movie_en.srt");

        let moved = request.relocate(Path::new("out"));
        assert_eq!(moved.output_path, Path::new("out").join("movie_en.srt"));
    }

    #[test]
    fn test_build_requests_keeps_order() {
        let map = ExtensionMap::default();
        let tracks = vec![track("4", "S_TEXT/ASS", "ja"), track("2", "S_TEXT/UTF8", "en")];
        let specs: Vec<_> = build_requests(Path::new("a.mkv"), &tracks, &map)
            .iter()
            .map(ExtractionRequest::track_spec)
            .collect();
        assert_eq!(specs, vec!["4:a_ja.ass", "2:a_en.srt"]);
    }
}
