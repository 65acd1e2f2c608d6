use std::collections::HashSet;

use log::{info, warn};

use super::Reconciler;
use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::CatalogResult;
use crate::models::{ItemOutcome, LikedSongEntry, LikedSongsReport, SearchFilter};
use crate::progress::{ProgressCounter, ProgressObserver};
use crate::utils::logging;

impl<'a, S: SourceCatalog, D: DestinationCatalog> Reconciler<'a, S, D> {
    /// Like the best destination match of every saved source track.
    ///
    /// Matches whose `"{artist} - {title}"` identity is already liked are
    /// skipped. Every successful like grows the in-memory set, so repeats
    /// further down the source list are skipped too.
    pub async fn transfer_liked_songs(
        &self,
        progress: &mut dyn ProgressObserver,
    ) -> CatalogResult<LikedSongsReport> {
        let saved_tracks = self.source.all_saved_tracks().await?;
        let mut liked: HashSet<String> = self
            .destination
            .liked_songs()
            .await?
            .iter()
            .map(|song| song.identity())
            .collect();

        let mut counter = ProgressCounter::new(saved_tracks.len());
        let mut report = LikedSongsReport::default();

        for track in &saved_tracks {
            let outcome = self.like_best_match(track, &mut liked).await;
            report.record(&outcome);
            progress.on_progress(counter.advance(1), &track.search_query());
        }

        progress.finish();
        Ok(report)
    }

    async fn like_best_match(
        &self,
        track: &LikedSongEntry,
        liked: &mut HashSet<String>,
    ) -> ItemOutcome {
        let query = track.search_query();
        let found = match self.best_match(&query, SearchFilter::Songs).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                logging::log_not_found(&query);
                return ItemOutcome::NotFound;
            }
            Err(e) => {
                logging::log_search_failed(&query, &e);
                return ItemOutcome::SearchFailed(e);
            }
        };

        let identity = found.identity();
        if liked.contains(&identity) {
            info!("{} is already liked on YouTube Music", identity);
            return ItemOutcome::AlreadyPresent;
        }

        match self.destination.like_song(&found.id).await {
            Ok(()) => {
                info!("Liked {} on YouTube Music", identity);
                liked.insert(identity);
                ItemOutcome::Added
            }
            Err(e) => {
                warn!("Could not like {} on YouTube Music (error: {})", identity, e);
                ItemOutcome::Failed(e)
            }
        }
    }
}
