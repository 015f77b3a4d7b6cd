//! List the liked library to stdout, going through the same cache
//! reconciliation as the playlist refresh.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use trueshuffle::cache::LikedCache;
use trueshuffle::client::SpotifyClient;
use trueshuffle::config::Config;
use trueshuffle::sync::reconcile;
use trueshuffle::track::SavedTrack;

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
    let reconciled = reconcile(&client, &cache).await?;

    println!("Total liked songs: {}\n", reconciled.tracks.len());
    for (idx, saved) in reconciled.tracks.iter().enumerate() {
        print_track(idx + 1, saved);
    }

    Ok(())
}

fn print_track(idx: usize, saved: &SavedTrack) {
    // Just the date part of the timestamp.
    let added = saved.added_at.get(..10).unwrap_or(&saved.added_at);
    println!("{idx}. {}", saved.track.name);
    println!("   Artist(s): {}", saved.artist_names());
    println!("   Album: {}", saved.track.album.name);
    println!("   Added: {added}");
}
