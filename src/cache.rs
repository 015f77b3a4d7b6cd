//! Disk snapshot of the liked library.
//!
//! The file format is deliberately stable and inspectable: pretty-printed
//! JSON with the capture timestamp, a count, and the raw track records:
//!
//! ```json
//! { "timestamp": "2023-06-15T12:30:00Z", "total_count": 2, "tracks": [...] }
//! ```
//!
//! Reads fail soft: a missing or unreadable file, malformed JSON, a count
//! that disagrees with the track list, or an unparseable timestamp all
//! surface as "no snapshot" so the caller falls back to a full fetch.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timestamp::parse_timestamp;
use crate::track::SavedTrack;

const CACHE_FILE_NAME: &str = "liked_songs_cache.json";

/// The cached liked library plus the instant it was captured.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub tracks: Vec<SavedTrack>,
}

/// On-disk form. The timestamp stays a string so hand-edited or
/// older-format files still load through the lenient parser.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    timestamp: String,
    total_count: usize,
    tracks: Vec<SavedTrack>,
}

pub struct LikedCache {
    path: PathBuf,
}

impl LikedCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location under the user cache directory.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no cache directory")
            })?
            .join("trueshuffle");
        fs::create_dir_all(&dir)?;
        Ok(dir.join(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the snapshot, or `None` when there is nothing usable on disk.
    ///
    /// Corruption is logged with the specific reason but never returned as
    /// an error; the caller cannot do anything smarter than refetch.
    pub fn load(&self) -> Option<Snapshot> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no liked-songs cache file");
            return None;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("could not read cache file, treating as absent: {e}");
                return None;
            }
        };

        let file: CacheFile = match serde_json::from_str(&contents) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("cache file corrupt, treating as absent: {e}");
                return None;
            }
        };

        if file.total_count != file.tracks.len() {
            tracing::warn!(
                expected = file.total_count,
                actual = file.tracks.len(),
                "cache track count mismatch, treating as absent"
            );
            return None;
        }

        let captured_at = match parse_timestamp(&file.timestamp) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("cache timestamp unusable, treating as absent: {e}");
                return None;
            }
        };

        Some(Snapshot {
            captured_at,
            tracks: file.tracks,
        })
    }

    /// Overwrite the snapshot. Writes a sibling temp file and renames it
    /// into place so a crash mid-write leaves the old snapshot intact.
    pub fn save(&self, tracks: &[SavedTrack], captured_at: DateTime<Utc>) -> Result<()> {
        let file = CacheFile {
            timestamp: captured_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            total_count: tracks.len(),
            tracks: tracks.to_vec(),
        };

        let contents = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;

        tracing::info!(count = tracks.len(), path = %self.path.display(), "saved liked-songs cache");
        Ok(())
    }
}
