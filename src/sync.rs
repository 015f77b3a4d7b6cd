//! Cache reconciliation for the liked library.
//!
//! Spotify has no "saved since X" query, so any change check costs a full
//! paginated fetch. The value of the check is avoiding a second
//! materialize-and-save pass when nothing changed: when new tracks are
//! detected, the drained list from the check itself becomes the new
//! snapshot, so a run never fetches the library twice.

use chrono::{DateTime, Utc};

use crate::cache::LikedCache;
use crate::client::Library;
use crate::error::Result;
use crate::timestamp::parse_timestamp;
use crate::track::SavedTrack;

/// What the change check learned about the remote library.
#[derive(Debug)]
pub enum ChangeCheck {
    /// Nothing saved after the cache capture instant.
    Unchanged,
    /// At least one newer track. Carries the full drained collection so
    /// the caller can save it without another fetch pass.
    Changed {
        tracks: Vec<SavedTrack>,
        new_count: usize,
    },
    /// The check could not complete; recency is unknown.
    Indeterminate,
}

/// Where a reconciled track list came from. Always wholly one or the
/// other, never a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Remote,
}

#[derive(Debug)]
pub struct Reconciled {
    pub tracks: Vec<SavedTrack>,
    pub source: Source,
}

/// Drain every page of the saved-tracks listing, in order.
pub async fn fetch_all_saved_tracks<C: Library + ?Sized>(client: &C) -> Result<Vec<SavedTrack>> {
    let mut tracks = Vec::new();
    let mut offset = Some(0);

    while let Some(current) = offset {
        let page = client.saved_tracks_page(current).await?;
        // An empty page means the listing is done regardless of `next`.
        if page.items.is_empty() {
            break;
        }
        tracks.extend(page.items);
        offset = page.next_offset;
    }

    Ok(tracks)
}

/// Check whether any tracks were saved after `since`.
///
/// Tracks whose `added_at` does not parse are skipped rather than failing
/// the whole pass; a fetch failure makes the result indeterminate.
pub async fn check_for_new_tracks<C: Library + ?Sized>(
    client: &C,
    since: DateTime<Utc>,
) -> ChangeCheck {
    let tracks = match fetch_all_saved_tracks(client).await {
        Ok(tracks) => tracks,
        Err(e) => {
            tracing::warn!("change check failed: {e}");
            return ChangeCheck::Indeterminate;
        }
    };

    let mut new_count = 0;
    let mut unparseable = 0;
    for saved in &tracks {
        match parse_timestamp(&saved.added_at) {
            Ok(added_at) if added_at > since => new_count += 1,
            Ok(_) => {}
            Err(_) => {
                unparseable += 1;
                tracing::debug!(uri = %saved.track.uri, added_at = %saved.added_at,
                    "skipping track with unparseable added_at");
            }
        }
    }
    if unparseable > 0 {
        tracing::warn!(count = unparseable, "tracks skipped during change check");
    }

    if new_count == 0 {
        ChangeCheck::Unchanged
    } else {
        ChangeCheck::Changed { tracks, new_count }
    }
}

/// Resolve the current liked library, using the disk snapshot when the
/// remote has not changed since it was captured.
///
/// Any uncertainty (no snapshot, corrupt snapshot, failed change check)
/// resolves to the expensive-but-safe path: fetch everything and overwrite
/// the snapshot.
pub async fn reconcile<C: Library + ?Sized>(
    client: &C,
    cache: &LikedCache,
) -> Result<Reconciled> {
    if let Some(snapshot) = cache.load() {
        tracing::info!(
            count = snapshot.tracks.len(),
            captured_at = %snapshot.captured_at,
            "loaded liked-songs cache"
        );

        match check_for_new_tracks(client, snapshot.captured_at).await {
            ChangeCheck::Unchanged => {
                tracing::info!("no new liked songs since cache, serving cached list");
                return Ok(Reconciled {
                    tracks: snapshot.tracks,
                    source: Source::Cache,
                });
            }
            ChangeCheck::Changed { tracks, new_count } => {
                tracing::info!(new_count, total = tracks.len(), "new liked songs, updating cache");
                cache.save(&tracks, Utc::now())?;
                return Ok(Reconciled {
                    tracks,
                    source: Source::Remote,
                });
            }
            ChangeCheck::Indeterminate => {
                tracing::warn!("could not determine recency, refetching everything");
            }
        }
    }

    let tracks = fetch_all_saved_tracks(client).await?;
    cache.save(&tracks, Utc::now())?;
    tracing::info!(count = tracks.len(), "fetched liked songs from Spotify");
    Ok(Reconciled {
        tracks,
        source: Source::Remote,
    })
}
