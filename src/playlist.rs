//! Replaces the destination playlist's contents.
//!
//! The playlist lives on Spotify's side and is never assumed to match any
//! local state: every run resolves it fresh, drains its current
//! membership, clears it, and repopulates it. Mutations go out strictly
//! one batch at a time; a failed batch aborts the rest of its phase and
//! the partially-updated playlist stays visible as-is (the API offers no
//! transaction to roll back).

use chrono::{DateTime, Utc};

use crate::client::{PlaylistInfo, PlaylistLookup, Playlists, PLAYLIST_PAGE_SIZE};
use crate::config::PlaylistConfig;
use crate::error::Result;

/// What a replacement run did, for reporting.
#[derive(Debug)]
pub struct ReplaceOutcome {
    pub playlist: PlaylistInfo,
    /// True when the playlist had to be created. The caller should persist
    /// the new id; nothing else maps the configured name back to it.
    pub created: bool,
    pub removed: usize,
    pub added: usize,
}

fn stamp_description(base: &str, now: DateTime<Utc>) -> String {
    format!("{base} Last updated: {}", now.format("%Y-%m-%d %H:%M"))
}

/// Resolve the destination playlist, creating it when the configured id is
/// missing or no longer resolves. Normalizes visibility and refreshes the
/// description on an existing playlist.
async fn resolve<P: Playlists + ?Sized>(
    api: &P,
    config: &PlaylistConfig,
    playlist_id: Option<&str>,
    description: &str,
) -> Result<(PlaylistInfo, bool)> {
    if let Some(id) = playlist_id {
        match api.find_playlist(id).await? {
            PlaylistLookup::Found(info) => {
                tracing::info!(id = %info.id, name = %info.name, "found playlist");

                let fix_visibility =
                    (info.public != Some(config.public)).then_some(config.public);
                if fix_visibility.is_some() {
                    tracing::info!(public = config.public, "normalizing playlist visibility");
                }
                api.update_details(&info.id, fix_visibility, Some(description))
                    .await?;

                return Ok((info, false));
            }
            PlaylistLookup::NotFound => {
                tracing::warn!(id, "configured playlist not found, creating a new one");
            }
        }
    }

    let info = api
        .create_playlist(&config.name, config.public, description)
        .await?;
    tracing::info!(id = %info.id, name = %info.name, "created playlist");
    Ok((info, true))
}

/// Remove everything currently in the playlist, in batches of at most
/// [`PLAYLIST_PAGE_SIZE`] uris. Entries whose track is gone from the
/// catalog carry no uri and are skipped.
async fn clear<P: Playlists + ?Sized>(api: &P, playlist_id: &str) -> Result<usize> {
    let mut uris = Vec::new();
    let mut offset = Some(0);

    while let Some(current) = offset {
        let page = api.playlist_items_page(playlist_id, current).await?;
        if page.items.is_empty() {
            break;
        }
        uris.extend(page.items.into_iter().filter_map(|entry| entry.uri));
        offset = page.next_offset;
    }

    if uris.is_empty() {
        tracing::info!("playlist is already empty");
        return Ok(0);
    }

    for batch in uris.chunks(PLAYLIST_PAGE_SIZE) {
        api.remove_items(playlist_id, batch).await?;
    }

    tracing::info!(count = uris.len(), "removed tracks from playlist");
    Ok(uris.len())
}

/// Append `uris` in submitted order, in batches of at most
/// [`PLAYLIST_PAGE_SIZE`].
async fn populate<P: Playlists + ?Sized>(
    api: &P,
    playlist_id: &str,
    uris: &[String],
) -> Result<usize> {
    for (i, batch) in uris.chunks(PLAYLIST_PAGE_SIZE).enumerate() {
        api.add_items(playlist_id, batch).await?;
        tracing::debug!(batch = i + 1, count = batch.len(), "added batch to playlist");
    }

    tracing::info!(count = uris.len(), "added tracks to playlist");
    Ok(uris.len())
}

/// Clear the destination playlist and fill it with `uris`.
///
/// The resolved playlist id is part of the outcome so the caller can
/// persist it after a first run that had to create the playlist.
pub async fn replace_playlist<P: Playlists + ?Sized>(
    api: &P,
    config: &PlaylistConfig,
    playlist_id: Option<&str>,
    uris: &[String],
) -> Result<ReplaceOutcome> {
    let description = stamp_description(&config.description, Utc::now());

    let (playlist, created) = resolve(api, config, playlist_id, &description).await?;
    let removed = clear(api, &playlist.id).await?;
    let added = populate(api, &playlist.id, uris).await?;

    Ok(ReplaceOutcome {
        playlist,
        created,
        removed,
        added,
    })
}
