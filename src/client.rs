//! Spotify Web API client.
//!
//! The sync and playlist logic only consume the two capability traits
//! ([`Library`] and [`Playlists`]) so tests can swap in-memory fakes for
//! the network. [`SpotifyClient`] is the real implementation.

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient, Response};
use serde::Deserialize;

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::track::SavedTrack;

const API_BASE: &str = "https://api.spotify.com/v1";

/// Page size for the saved-tracks endpoint (API maximum).
pub const SAVED_TRACKS_PAGE_SIZE: usize = 50;
/// Page size for playlist membership reads (API maximum).
pub const PLAYLIST_PAGE_SIZE: usize = 100;

/// One page of a paginated listing. `next_offset` is `None` on the last
/// page; a consumer restarts the sequence by fetching offset 0 again.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_offset: Option<usize>,
    pub total: usize,
}

/// An entry in a playlist's membership list. The track can be gone
/// (removed from the catalog), in which case `uri` is `None`.
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    pub uri: Option<String>,
}

/// Playlist metadata as the service reports it.
#[derive(Debug, Clone)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    pub public: Option<bool>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Outcome of a playlist lookup. Transport failures stay in `Err`; only a
/// definite 404 maps to `NotFound`.
#[derive(Debug, Clone)]
pub enum PlaylistLookup {
    Found(PlaylistInfo),
    NotFound,
}

/// Read access to the user's liked library.
#[async_trait]
pub trait Library: Send + Sync {
    async fn saved_tracks_page(&self, offset: usize) -> Result<Page<SavedTrack>>;
}

/// Playlist lookup and mutation.
///
/// `add_items` / `remove_items` take at most [`PLAYLIST_PAGE_SIZE`] uris per
/// call; batching is the caller's job.
#[async_trait]
pub trait Playlists: Send + Sync {
    async fn find_playlist(&self, playlist_id: &str) -> Result<PlaylistLookup>;

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistInfo>;

    async fn update_details(
        &self,
        playlist_id: &str,
        public: Option<bool>,
        description: Option<&str>,
    ) -> Result<()>;

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        offset: usize,
    ) -> Result<Page<PlaylistEntry>>;

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    async fn remove_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;
}

// API response models

#[derive(Debug, Deserialize)]
struct SavedTracksResponse {
    items: Vec<SavedTrack>,
    next: Option<String>,
    total: usize,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    items: Vec<PlaylistItem>,
    next: Option<String>,
    total: usize,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<PlaylistItemTrack>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemTrack {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    id: String,
    name: String,
    public: Option<bool>,
    description: Option<String>,
    external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

impl From<PlaylistResponse> for PlaylistInfo {
    fn from(resp: PlaylistResponse) -> Self {
        Self {
            id: resp.id,
            name: resp.name,
            public: resp.public,
            description: resp.description,
            url: resp.external_urls.and_then(|u| u.spotify),
        }
    }
}

fn next_offset(offset: usize, page_len: usize, has_next: bool) -> Option<usize> {
    has_next.then_some(offset + page_len)
}

pub struct SpotifyClient {
    http: HttpClient,
    credentials: Credentials,
}

impl SpotifyClient {
    /// Load stored credentials, refresh the access token if needed, and
    /// return a ready client.
    pub async fn new() -> Result<Self> {
        let http = HttpClient::new();
        let mut credentials = Credentials::load()?;
        credentials.refresh_if_needed(&http).await?;
        Ok(Self { http, credentials })
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            http: HttpClient::new(),
            credentials,
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.credentials.access_token)
    }

    /// Turn a non-success response into the right error, carrying status
    /// and body for diagnostics.
    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::from_status(status, body))
    }
}

#[async_trait]
impl Library for SpotifyClient {
    async fn saved_tracks_page(&self, offset: usize) -> Result<Page<SavedTrack>> {
        let response = self
            .http
            .get(format!("{API_BASE}/me/tracks"))
            .header(header::AUTHORIZATION, self.bearer())
            .query(&[
                ("limit", SAVED_TRACKS_PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;

        let parsed: SavedTracksResponse = Self::check(response).await?.json().await?;
        Ok(Page {
            next_offset: next_offset(offset, parsed.items.len(), parsed.next.is_some()),
            total: parsed.total,
            items: parsed.items,
        })
    }
}

#[async_trait]
impl Playlists for SpotifyClient {
    async fn find_playlist(&self, playlist_id: &str) -> Result<PlaylistLookup> {
        let response = self
            .http
            .get(format!("{API_BASE}/playlists/{playlist_id}"))
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Ok(PlaylistLookup::NotFound);
        }

        let parsed: PlaylistResponse = Self::check(response).await?.json().await?;
        Ok(PlaylistLookup::Found(parsed.into()))
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistInfo> {
        let response = self
            .http
            .get(format!("{API_BASE}/me"))
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;
        let user: UserResponse = Self::check(response).await?.json().await?;

        let response = self
            .http
            .post(format!("{API_BASE}/users/{}/playlists", user.id))
            .header(header::AUTHORIZATION, self.bearer())
            .json(&serde_json::json!({
                "name": name,
                "public": public,
                "description": description,
            }))
            .send()
            .await?;

        let parsed: PlaylistResponse = Self::check(response).await?.json().await?;
        Ok(parsed.into())
    }

    async fn update_details(
        &self,
        playlist_id: &str,
        public: Option<bool>,
        description: Option<&str>,
    ) -> Result<()> {
        if public.is_none() && description.is_none() {
            return Ok(());
        }

        let mut body = serde_json::Map::new();
        if let Some(public) = public {
            body.insert("public".into(), public.into());
        }
        if let Some(description) = description {
            body.insert("description".into(), description.into());
        }

        let response = self
            .http
            .put(format!("{API_BASE}/playlists/{playlist_id}"))
            .header(header::AUTHORIZATION, self.bearer())
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn playlist_items_page(
        &self,
        playlist_id: &str,
        offset: usize,
    ) -> Result<Page<PlaylistEntry>> {
        let response = self
            .http
            .get(format!("{API_BASE}/playlists/{playlist_id}/tracks"))
            .header(header::AUTHORIZATION, self.bearer())
            .query(&[
                ("limit", PLAYLIST_PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
                ("fields", "items(track(uri)),next,total".to_string()),
            ])
            .send()
            .await?;

        let parsed: PlaylistItemsResponse = Self::check(response).await?.json().await?;
        let items: Vec<PlaylistEntry> = parsed
            .items
            .into_iter()
            .map(|item| PlaylistEntry {
                uri: item.track.and_then(|t| t.uri),
            })
            .collect();

        Ok(Page {
            next_offset: next_offset(offset, items.len(), parsed.next.is_some()),
            total: parsed.total,
            items,
        })
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        if uris.is_empty() {
            return Ok(());
        }

        let response = self
            .http
            .post(format!("{API_BASE}/playlists/{playlist_id}/tracks"))
            .header(header::AUTHORIZATION, self.bearer())
            .json(&serde_json::json!({ "uris": uris }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn remove_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        if uris.is_empty() {
            return Ok(());
        }

        let tracks: Vec<_> = uris
            .iter()
            .map(|uri| serde_json::json!({ "uri": uri }))
            .collect();

        let response = self
            .http
            .delete(format!("{API_BASE}/playlists/{playlist_id}/tracks"))
            .header(header::AUTHORIZATION, self.bearer())
            .json(&serde_json::json!({ "tracks": tracks }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_offset_advances_by_page_length() {
        assert_eq!(next_offset(0, 50, true), Some(50));
        assert_eq!(next_offset(50, 50, true), Some(100));
    }

    #[test]
    fn test_next_offset_stops_on_last_page() {
        assert_eq!(next_offset(100, 23, false), None);
    }

    #[test]
    fn test_parse_saved_tracks_response() {
        let json = r#"{
            "items": [
                {"added_at": "2023-06-15T12:30:00Z", "track": {
                    "uri": "spotify:track:a", "name": "Song",
                    "artists": [{"name": "Artist"}], "album": {"name": "Album"}
                }}
            ],
            "next": "https://api.spotify.com/v1/me/tracks?offset=50&limit=50",
            "total": 1234
        }"#;

        let parsed: SavedTracksResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.total, 1234);
        assert!(parsed.next.is_some());
    }

    #[test]
    fn test_parse_playlist_items_with_null_track() {
        let json = r#"{
            "items": [
                {"track": {"uri": "spotify:track:a"}},
                {"track": null},
                {"track": {"uri": null}}
            ],
            "next": null,
            "total": 3
        }"#;

        let parsed: PlaylistItemsResponse = serde_json::from_str(json).unwrap();
        let uris: Vec<Option<&str>> = parsed
            .items
            .iter()
            .map(|i| i.track.as_ref().and_then(|t| t.uri.as_deref()))
            .collect();
        assert_eq!(uris, [Some("spotify:track:a"), None, None]);
    }

    #[test]
    fn test_parse_playlist_response_without_url() {
        let json = r#"{"id": "pl1", "name": "True Shuffle", "public": false, "description": ""}"#;
        let info: PlaylistInfo = serde_json::from_str::<PlaylistResponse>(json).unwrap().into();
        assert_eq!(info.id, "pl1");
        assert_eq!(info.public, Some(false));
        assert!(info.url.is_none());
    }
}
