use std::collections::HashMap;

use log::{info, warn};

use super::Reconciler;
use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::CatalogResult;
use crate::models::{
    DestinationPlaylist, ItemOutcome, PlaylistTransferReport, SearchFilter, SourcePlaylist,
};
use crate::progress::{ProgressCounter, ProgressObserver};
use crate::utils::logging;

/// Index destination playlists by display name. When two share a name
/// the first one in listing order wins.
fn index_by_name(playlists: &[DestinationPlaylist]) -> HashMap<&str, &DestinationPlaylist> {
    let mut index = HashMap::new();
    for playlist in playlists {
        index.entry(playlist.name.as_str()).or_insert(playlist);
    }
    index
}

impl<'a, S: SourceCatalog, D: DestinationCatalog> Reconciler<'a, S, D> {
    /// Recreate every source playlist in the destination library.
    ///
    /// A same-named destination playlist with the same track count is
    /// left alone; one with a different count is deleted and rebuilt from
    /// scratch. Progress is reported per track across the whole batch and
    /// ends at exactly 100%.
    pub async fn transfer_playlists(
        &self,
        progress: &mut dyn ProgressObserver,
    ) -> CatalogResult<PlaylistTransferReport> {
        let source_playlists = self.source.all_playlists().await?;
        let destination_playlists = self.destination.library_playlists().await?;
        let existing = index_by_name(&destination_playlists);

        let total_tracks = source_playlists.iter().map(|p| p.track_count).sum();
        let mut counter = ProgressCounter::new(total_tracks);
        let mut report = PlaylistTransferReport::default();

        for playlist in &source_playlists {
            let recreating = match existing.get(playlist.name.as_str()) {
                Some(current) if current.track_count == Some(playlist.track_count) => {
                    info!("{} already exists on YouTube Music. Skipping...", playlist.name);
                    report.skipped += 1;
                    progress.on_progress(
                        counter.advance(playlist.track_count),
                        &format!("Skipped {}", playlist.name),
                    );
                    continue;
                }
                Some(current) => {
                    info!(
                        "{} exists on YouTube Music, but has a different track list. Recreating the playlist...",
                        playlist.name
                    );
                    if let Err(e) = self.destination.delete_playlist(&current.id).await {
                        warn!(
                            "Could not delete stale {} on YouTube Music (error: {}). Skipping...",
                            playlist.name, e
                        );
                        report.record_playlist_failure(&e);
                        progress.on_progress(
                            counter.advance(playlist.track_count),
                            &format!("Failed {}", playlist.name),
                        );
                        continue;
                    }
                    true
                }
                None => {
                    info!("{} does not exist on YouTube Music. Creating...", playlist.name);
                    false
                }
            };

            let destination_id = match self
                .destination
                .create_playlist(&playlist.name, &playlist.description)
                .await
            {
                Ok(id) => id,
                Err(e) => {
                    logging::log_playlist_create_failed(&playlist.name, &e);
                    report.record_playlist_failure(&e);
                    progress.on_progress(
                        counter.advance(playlist.track_count),
                        &format!("Failed {}", playlist.name),
                    );
                    continue;
                }
            };
            if recreating {
                report.recreated += 1;
            } else {
                report.created += 1;
            }

            let processed = self
                .copy_tracks(playlist, &destination_id, &mut report, &mut counter, progress)
                .await;

            // The reported count can be stale or include unplayable items.
            if processed < playlist.track_count {
                progress.on_progress(
                    counter.advance(playlist.track_count - processed),
                    &format!("Finished {}", playlist.name),
                );
            }
        }

        progress.finish();
        Ok(report)
    }

    /// Search and add each source track. Returns the number of tracks walked.
    async fn copy_tracks(
        &self,
        playlist: &SourcePlaylist,
        destination_id: &str,
        report: &mut PlaylistTransferReport,
        counter: &mut ProgressCounter,
        progress: &mut dyn ProgressObserver,
    ) -> usize {
        let tracks = match self.source.all_playlist_tracks(&playlist.id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(
                    "Could not read the tracks of {} from Spotify (error: {}). Skipping...",
                    playlist.name, e
                );
                report.record_playlist_failure(&e);
                return 0;
            }
        };

        for track in &tracks {
            let query = track.search_query();
            let outcome = self
                .add_best_match(&query, destination_id, &playlist.name)
                .await;
            report.record_track(&outcome);
            progress.on_progress(
                counter.advance(1),
                &format!("Adding {} to {}", query, playlist.name),
            );
        }

        tracks.len()
    }

    async fn add_best_match(
        &self,
        query: &str,
        destination_id: &str,
        playlist_name: &str,
    ) -> ItemOutcome {
        let found = match self.best_match(query, SearchFilter::Songs).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                logging::log_not_found(query);
                return ItemOutcome::NotFound;
            }
            Err(e) => {
                logging::log_search_failed(query, &e);
                return ItemOutcome::SearchFailed(e);
            }
        };

        match self
            .destination
            .add_playlist_items(destination_id, &[found.id])
            .await
        {
            Ok(()) => {
                logging::log_track_added(query, playlist_name);
                ItemOutcome::Added
            }
            Err(e) => {
                logging::log_track_add_failed(query, playlist_name, &e);
                ItemOutcome::Failed(e)
            }
        }
    }
}
