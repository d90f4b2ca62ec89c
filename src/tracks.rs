//! Subtitle track resolution on top of a parsed [`MetadataTree`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use crate::tree::{MetadataTree, NodeId};

/// Name of the `mkvinfo` section listing every track.
pub const TRACKS_SECTION: &str = "Tracks";

pub const TRACK_TYPE_KEY: &str = "Track type";
pub const TRACK_NUMBER_KEY: &str = "Track number";
pub const CODEC_ID_KEY: &str = "Codec ID";
pub const LANGUAGE_KEY: &str = "Language (IETF BCP 47)";

const SUBTITLES_TYPE: &str = "subtitles";
const UNDEFINED_LANGUAGE: &str = "und";

static TRACK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"track ID for mkvmerge & mkvextract: (\d+)").expect("invalid track ID pattern")
});

/// Properties of one track, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackRecord {
    properties: HashMap<String, String>,
}

impl TrackRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Set a property; a repeated name replaces the earlier value.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TrackRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::default();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// A subtitle track that mkvextract can pull out of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Track ID as understood by mkvmerge and mkvextract
    pub track_id: String,
    /// Matroska codec ID, e.g. `S_TEXT/UTF8`
    pub format: String,
    /// IETF BCP 47 language tag, `und` when the file does not declare one
    pub language: String,
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track ID: {}, Format: {}, Language: {}",
            self.track_id, self.format, self.language
        )
    }
}

/// Turn every child of the track-list node into a record built from that
/// child's direct properties. Deeper sections (e.g. `Video track`) are not
/// descended into.
pub fn flatten(tree: &MetadataTree, tracks: NodeId) -> Vec<TrackRecord> {
    tree.children(tracks)
        .map(|track| {
            tree.children(track)
                .map(|prop| {
                    let node = tree.node(prop);
                    (node.name.clone(), node.value.clone())
                })
                .collect()
        })
        .collect()
}

/// Keep the subtitle tracks that carry an extractable track ID.
pub fn resolve(records: &[TrackRecord]) -> Vec<SubtitleTrack> {
    records
        .iter()
        .filter(|record| record.get(TRACK_TYPE_KEY) == Some(SUBTITLES_TYPE))
        .filter_map(|record| {
            let number = record.get(TRACK_NUMBER_KEY)?;
            let Some(captures) = TRACK_ID.captures(number) else {
                debug!("Skipping subtitle track without extractable ID: {}", number);
                return None;
            };

            Some(SubtitleTrack {
                track_id: captures[1].to_string(),
                format: record.get(CODEC_ID_KEY).unwrap_or_default().to_string(),
                language: record
                    .get(LANGUAGE_KEY)
                    .unwrap_or(UNDEFINED_LANGUAGE)
                    .to_string(),
            })
        })
        .collect()
}

/// Subtitle tracks described by a parsed `mkvinfo` tree. A tree without a
/// track-list section yields no tracks.
pub fn subtitle_tracks(tree: &MetadataTree) -> Vec<SubtitleTrack> {
    match tree.find_by_name(tree.root(), TRACKS_SECTION) {
        Some(tracks) => resolve(&flatten(tree, tracks)),
        None => {
            debug!("No {} section found", TRACKS_SECTION);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtitle_record(number: &str) -> TrackRecord {
        [
            (TRACK_TYPE_KEY, SUBTITLES_TYPE),
            (TRACK_NUMBER_KEY, number),
            (CODEC_ID_KEY, "S_TEXT/UTF8"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolve_subtitle_track() {
        let mut record = subtitle_record("4 (track ID for mkvmerge & mkvextract: 3)");
        record.insert(LANGUAGE_KEY, "en");

        assert_eq!(
            resolve(&[record]),
            vec![SubtitleTrack {
                track_id: "3".to_string(),
                format: "S_TEXT/UTF8".to_string(),
                language: "en".to_string(),
            }]
        );
    }

    #[test]
    fn test_audio_track_is_never_resolved() {
        let mut record = subtitle_record("2 (track ID for mkvmerge & mkvextract: 1)");
        record.insert(TRACK_TYPE_KEY, "audio");
        record.insert(LANGUAGE_KEY, "fr");

        assert!(resolve(&[record]).is_empty());
    }

    #[test]
    fn test_missing_type_is_skipped() {
        let record: TrackRecord = [(TRACK_NUMBER_KEY, "1 (track ID for mkvmerge & mkvextract: 0)")]
            .into_iter()
            .collect();
        assert!(resolve(&[record]).is_empty());
    }

    #[test]
    fn test_missing_language_defaults_to_und() {
        let tracks = resolve(&[subtitle_record("1 (track ID for mkvmerge & mkvextract: 0)")]);
        assert_eq!(tracks[0].language, "und");
    }

    #[test]
    fn test_unmatched_track_number_is_skipped() {
        assert!(resolve(&[subtitle_record("5")]).is_empty());

        let mut no_number = subtitle_record("");
        no_number.properties.remove(TRACK_NUMBER_KEY);
        assert!(resolve(&[no_number]).is_empty());
    }

    #[test]
    fn test_unknown_codec_passes_through() {
        let mut record = subtitle_record("7 (track ID for mkvmerge & mkvextract: 6)");
        record.insert(CODEC_ID_KEY, "S_HDMV/PGS");
        assert_eq!(resolve(&[record])[0].format, "S_HDMV/PGS");
    }

    #[test]
    fn test_resolve_keeps_order_and_duplicates() {
        let first = subtitle_record("3 (track ID for mkvmerge & mkvextract: 9)");
        let second = subtitle_record("2 (track ID for mkvmerge & mkvextract: 1)");
        let ids: Vec<_> = resolve(&[first.clone(), second, first])
            .into_iter()
            .map(|t| t.track_id)
            .collect();
        assert_eq!(ids, vec!["9", "1", "9"]);
    }

    #[test]
    fn test_flatten_reads_one_level() {
        let tree = MetadataTree::parse(
            "+ Segment\n|+ Tracks\n| + Track\n|  + Track type: video\n|  + Video track\n|   + Pixel width: 1280\n| + Track\n|  + Name: a\n|  + Name: b\n",
        );
        let tracks = tree.find_by_name(tree.root(), TRACKS_SECTION).unwrap();
        let records = flatten(&tree, tracks);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(TRACK_TYPE_KEY), Some("video"));
        assert_eq!(records[0].get("Video track"), Some(""));
        assert_eq!(records[0].get("Pixel width"), None);
        assert_eq!(records[1].get("Name"), Some("b"));
        assert_eq!(records[1].len(), 1);
    }

    #[test]
    fn test_tree_without_tracks_section() {
        let tree = MetadataTree::parse("+ EBML head\n|+ EBML version: 1\n");
        assert!(subtitle_tracks(&tree).is_empty());
        assert!(subtitle_tracks(&MetadataTree::default()).is_empty());
    }

    #[test]
    fn test_subtitle_tracks_from_tree() {
        let tree = MetadataTree::parse(
            "\
+ Segment
|+ Tracks
| + Track
|  + Track number: 4 (track ID for mkvmerge & mkvextract: 3)
|  + Track type: subtitles
|  + Codec ID: S_TEXT/UTF8
|  + Language (IETF BCP 47): en
",
        );

        assert_eq!(
            subtitle_tracks(&tree),
            vec![SubtitleTrack {
                track_id: "3".to_string(),
                format: "S_TEXT/UTF8".to_string(),
                language: "en".to_string(),
            }]
        );
    }

    #[test]
    fn test_display() {
        let track = SubtitleTrack {
            track_id: "2".to_string(),
            format: "S_TEXT/ASS".to_string(),
            language: "ja".to_string(),
        };
        assert_eq!(track.to_string(), "Track ID: 2, Format: S_TEXT/ASS, Language: ja");
    }
}
