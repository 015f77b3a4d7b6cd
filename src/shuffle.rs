//! The "true shuffle" sample.
//!
//! Spotify's built-in shuffle weights recently played tracks; this picks a
//! uniform random subset of the whole liked library instead, so every
//! subset of the requested size is equally likely.

use rand::seq::index;
use rand::Rng;

use crate::track::SavedTrack;

/// Pick `requested` items uniformly at random, without replacement, in
/// random order. Positions are sampled, so value-duplicates in the input
/// count as distinct entries and never repeat in the output.
///
/// Asking for more items than exist clamps to the full list and reports it
/// via the returned flag. A warning, not an error.
pub fn sample_tracks<T: Clone, R: Rng>(
    rng: &mut R,
    items: &[T],
    requested: usize,
) -> (Vec<T>, bool) {
    let clamped = requested > items.len();
    if clamped {
        tracing::warn!(
            requested,
            available = items.len(),
            "fewer liked songs than requested, using all of them"
        );
    }
    let amount = requested.min(items.len());

    let selected = index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect();

    (selected, clamped)
}

/// Membership URIs for playlist operations, in the given order.
pub fn track_uris(tracks: &[SavedTrack]) -> Vec<String> {
    tracks.iter().map(|t| t.track.uri.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_returns_exactly_k_distinct_items() {
        let items: Vec<usize> = (0..100).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let (selected, clamped) = sample_tracks(&mut rng, &items, 25);

        assert_eq!(selected.len(), 25);
        assert!(!clamped);
        let unique: HashSet<_> = selected.iter().collect();
        assert_eq!(unique.len(), 25);
    }

    #[test]
    fn test_sample_clamps_when_too_few_items() {
        let items: Vec<usize> = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let (selected, clamped) = sample_tracks(&mut rng, &items, 150);

        assert!(clamped);
        assert_eq!(selected.len(), 5);
        let unique: HashSet<_> = selected.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_sample_exact_size_is_not_a_clamp() {
        let items: Vec<usize> = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let (selected, clamped) = sample_tracks(&mut rng, &items, 5);
        assert!(!clamped);
        assert_eq!(selected.len(), 5);
    }

    #[test]
    fn test_sample_of_empty_list_is_empty() {
        let items: Vec<usize> = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);

        let (selected, clamped) = sample_tracks(&mut rng, &items, 10);
        assert!(clamped);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_duplicate_values_are_distinct_positions() {
        // Four copies of the same value: sampling 3 positions still
        // returns 3 entries.
        let items = vec!["same"; 4];
        let mut rng = StdRng::seed_from_u64(7);

        let (selected, _) = sample_tracks(&mut rng, &items, 3);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_sample_is_deterministic_per_seed() {
        let items: Vec<usize> = (0..50).collect();

        let (a, _) = sample_tracks(&mut StdRng::seed_from_u64(42), &items, 10);
        let (b, _) = sample_tracks(&mut StdRng::seed_from_u64(42), &items, 10);
        let (c, _) = sample_tracks(&mut StdRng::seed_from_u64(43), &items, 10);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_every_item_reachable_across_seeds() {
        let items: Vec<usize> = (0..10).collect();
        let mut seen = HashSet::new();

        for seed in 0..200 {
            let (selected, _) = sample_tracks(&mut StdRng::seed_from_u64(seed), &items, 3);
            seen.extend(selected);
        }

        assert_eq!(seen.len(), items.len());
    }
}
