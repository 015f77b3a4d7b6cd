//! Data model for saved ("liked") tracks.
//!
//! These mirror the shape of Spotify's saved-track objects closely enough
//! that the cache file stays a faithful, human-inspectable copy of what the
//! API returned: fields this tool does not interpret are captured via
//! `#[serde(flatten)]` and written back out unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry from the user's liked library: the track plus the instant it
/// was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    /// ISO-8601 string as delivered by the API. Parsed lazily, since a
    /// bad value must not poison the rest of the list.
    pub added_at: String,
    pub track: Track,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub album: Album,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SavedTrack {
    /// "Artist A, Artist B" for display.
    pub fn artist_names(&self) -> String {
        self.track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_saved_track() {
        let json = r#"{
            "added_at": "2023-06-15T12:30:00Z",
            "track": {
                "uri": "spotify:track:abc123",
                "name": "Song",
                "artists": [{"name": "Artist A"}, {"name": "Artist B"}],
                "album": {"name": "Album"}
            }
        }"#;

        let saved: SavedTrack = serde_json::from_str(json).unwrap();
        assert_eq!(saved.added_at, "2023-06-15T12:30:00Z");
        assert_eq!(saved.track.uri, "spotify:track:abc123");
        assert_eq!(saved.artist_names(), "Artist A, Artist B");
        assert_eq!(saved.track.album.name, "Album");
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let json = r#"{
            "added_at": "2023-06-15T12:30:00Z",
            "track": {
                "uri": "spotify:track:abc123",
                "name": "Song",
                "artists": [{"name": "Artist", "id": "artist-id"}],
                "album": {"name": "Album", "release_date": "1999-01-01"},
                "duration_ms": 210000,
                "external_urls": {"spotify": "https://open.spotify.com/track/abc123"}
            }
        }"#;

        let saved: SavedTrack = serde_json::from_str(json).unwrap();
        let rewritten = serde_json::to_value(&saved).unwrap();

        assert_eq!(rewritten["track"]["duration_ms"], 210000);
        assert_eq!(
            rewritten["track"]["external_urls"]["spotify"],
            "https://open.spotify.com/track/abc123"
        );
        assert_eq!(rewritten["track"]["artists"][0]["id"], "artist-id");
        assert_eq!(rewritten["track"]["album"]["release_date"], "1999-01-01");
    }
}
