//! Refresh the True Shuffle playlist with a fresh random sample of liked
//! songs. Meant to run unattended (cron, CI schedule) once a day.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use trueshuffle::cache::LikedCache;
use trueshuffle::client::SpotifyClient;
use trueshuffle::config::Config;
use trueshuffle::playlist::replace_playlist;
use trueshuffle::shuffle::{sample_tracks, track_uris};
use trueshuffle::sync::{reconcile, Source};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::load()?;

    let cache_path = match &config.cache.file {
        Some(path) => path.clone(),
        None => LikedCache::default_path()?,
    };
    let cache = LikedCache::new(cache_path);

    let client = SpotifyClient::new().await?;

    println!("Fetching your liked songs...");
    let reconciled = reconcile(&client, &cache).await?;
    match reconciled.source {
        Source::Cache => println!(
            "Found {} liked songs (cache is current, no refetch needed).",
            reconciled.tracks.len()
        ),
        Source::Remote => println!("Found {} liked songs.", reconciled.tracks.len()),
    }

    let requested = config.shuffle.num_songs;
    let (selected, clamped) =
        sample_tracks(&mut rand::thread_rng(), &reconciled.tracks, requested);
    if clamped {
        println!(
            "Warning: only {} liked songs available, but {} requested. Using all of them.",
            selected.len(),
            requested
        );
    }
    println!("Selected {} random songs.", selected.len());

    let uris = track_uris(&selected);
    let outcome = replace_playlist(&client, &config.playlist, config.playlist_id().as_deref(), &uris)
        .await?;

    if outcome.created {
        println!(
            "Created playlist \"{}\" ({}).",
            outcome.playlist.name, outcome.playlist.id
        );
        println!(
            "Store this id in the config file or TRUESHUFFLE_PLAYLIST_ID so future runs reuse it."
        );
    }
    println!(
        "Replaced playlist contents: removed {}, added {}.",
        outcome.removed, outcome.added
    );
    if let Some(url) = &outcome.playlist.url {
        println!("Playlist URL: {url}");
    }

    Ok(())
}
