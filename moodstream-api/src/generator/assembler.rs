//! Candidate track assembly
//!
//! Builds the candidate pool for one generation request by crossing the
//! intent's genres with its moods (one catalog search per pair) and
//! adding up to three generic mood/genre queries joined with the
//! language preferences. Duplicates across queries are expected; the
//! selector collapses them later.

use crate::generator::Intent;
use crate::services::catalog::{CatalogError, CatalogSource, Track};

/// Page size for every assembly search
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Cap on the generic mood/genre queries
pub const MAX_GENERIC_QUERIES: usize = 3;

/// Gather candidate tracks for the intent, duplicates included.
///
/// The genre x mood searches are best-effort: a failing pair is logged
/// and skipped. The generic queries are on the required path and abort
/// the request on failure.
pub async fn assemble_candidates(
    catalog: &dyn CatalogSource,
    intent: &Intent,
) -> Result<Vec<Track>, CatalogError> {
    let mut candidates = Vec::new();

    for genre in &intent.genres {
        for mood in &intent.moods {
            let query = format!("{} {}", genre, mood);
            match catalog.search(&query, SEARCH_PAGE_SIZE).await {
                Ok(tracks) => candidates.extend(tracks),
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Genre/mood search failed, skipping");
                }
            }
        }
    }

    for query in generic_queries(intent) {
        candidates.extend(catalog.search(&query, SEARCH_PAGE_SIZE).await?);
    }

    tracing::debug!(candidates = candidates.len(), "Candidate assembly complete");

    Ok(candidates)
}

/// Generic queries: each mood, then each genre, joined with the
/// language preferences, capped at [`MAX_GENERIC_QUERIES`].
fn generic_queries(intent: &Intent) -> Vec<String> {
    intent
        .moods
        .iter()
        .chain(intent.genres.iter())
        .map(|term| {
            let mut parts = vec![term.clone()];
            parts.extend(intent.language_preferences.iter().cloned());
            parts.join(" ")
        })
        .take(MAX_GENERIC_QUERIES)
        .collect()
}
