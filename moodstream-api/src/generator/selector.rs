//! Candidate deduplication and duration-bounded selection

use std::collections::HashMap;

use crate::services::catalog::Track;

/// Collapse duplicate track ids.
///
/// Built by keyed insertion, so when the same id occurs more than once
/// the last occurrence in input order wins. Duplicate occurrences are
/// expected to carry identical metadata, so the choice is benign.
/// Output order is unspecified; callers shuffle before selection.
pub fn dedupe_tracks(candidates: Vec<Track>) -> Vec<Track> {
    let mut by_id: HashMap<String, Track> = HashMap::with_capacity(candidates.len());
    for track in candidates {
        by_id.insert(track.track_id.clone(), track);
    }
    by_id.into_values().collect()
}

/// Greedily fill the selection until the accumulated duration reaches
/// the target or the pool is exhausted.
///
/// The track that pushes the total past the target is always included;
/// overshoot is accepted and unbounded. Returns the selection and the
/// achieved duration in seconds.
pub fn select_tracks(pool: Vec<Track>, target_duration_sec: u32) -> (Vec<Track>, u32) {
    let mut selected = Vec::new();
    let mut total_sec = 0u32;

    for track in pool {
        if total_sec >= target_duration_sec {
            break;
        }
        total_sec += track.duration_sec;
        selected.push(track);
    }

    (selected, total_sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str, duration_sec: u32) -> Track {
        Track {
            track_id: id.to_string(),
            title: title.to_string(),
            artist_name: "Artist".to_string(),
            duration_sec,
            thumbnail_url: None,
            genre: None,
            tags: vec![],
        }
    }

    #[test]
    fn dedupe_keeps_last_occurrence() {
        let candidates = vec![
            track("a", "first a", 100),
            track("b", "only b", 200),
            track("a", "second a", 100),
        ];

        let mut deduped = dedupe_tracks(candidates);
        deduped.sort_by(|x, y| x.track_id.cmp(&y.track_id));

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].track_id, "a");
        assert_eq!(deduped[0].title, "second a");
        assert_eq!(deduped[1].track_id, "b");
    }

    #[test]
    fn selection_stops_at_first_prefix_reaching_target() {
        let pool = vec![
            track("a", "a", 50),
            track("b", "b", 40),
            track("c", "c", 40),
            track("d", "d", 100),
        ];

        let (selected, total) = select_tracks(pool, 120);

        assert_eq!(selected.len(), 3);
        assert_eq!(total, 130);
        assert!(selected.iter().all(|t| t.track_id != "d"));
    }

    #[test]
    fn selection_exhausts_pool_below_target() {
        let pool = vec![track("a", "a", 400), track("b", "b", 400)];

        let (selected, total) = select_tracks(pool, 1800);

        assert_eq!(selected.len(), 2);
        assert_eq!(total, 800);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let (selected, total) = select_tracks(vec![], 1800);
        assert!(selected.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn terminating_track_is_included_despite_overshoot() {
        let pool = vec![track("a", "a", 10), track("b", "b", 3600)];

        let (selected, total) = select_tracks(pool, 60);

        assert_eq!(selected.len(), 2);
        assert_eq!(total, 3610);
    }
}
