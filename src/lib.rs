//! Keeps a "True Shuffle" Spotify playlist filled with a uniform random
//! sample of the user's liked songs.
//!
//! The liked library is snapshotted to a JSON cache on disk; each run
//! checks whether anything was saved since the snapshot and only pays for
//! a refetch when something was (or when the snapshot is unusable).

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod playlist;
pub mod shuffle;
pub mod sync;
pub mod timestamp;
pub mod track;

pub use cache::{LikedCache, Snapshot};
pub use client::{Library, Page, PlaylistInfo, PlaylistLookup, Playlists, SpotifyClient};
pub use config::Config;
pub use error::{Error, Result};
pub use track::SavedTrack;
