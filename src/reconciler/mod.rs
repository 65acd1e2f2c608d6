//! Source → destination reconciliation.
//!
//! Each entry point takes one snapshot of both libraries, then walks the
//! source entities in order and issues the mutations the destination is
//! missing. Per-item failures are logged and counted; only a failure to
//! take a snapshot aborts an entry point.

mod followed_artists;
mod liked_songs;
mod playlists;

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::CatalogResult;
use crate::models::{PlaylistPreview, SearchFilter, SearchMatch};

/// Number of tracks listed per playlist by [`Reconciler::preview_playlists`]
pub const PREVIEW_SAMPLE_SIZE: usize = 3;

/// Drives transfers from a source library into a destination library
pub struct Reconciler<'a, S, D> {
    source: &'a S,
    destination: &'a D,
}

impl<'a, S: SourceCatalog, D: DestinationCatalog> Reconciler<'a, S, D> {
    /// Create a new Reconciler instance
    pub fn new(source: &'a S, destination: &'a D) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Top-ranked destination candidate for a query, if any
    async fn best_match(
        &self,
        query: &str,
        filter: SearchFilter,
    ) -> CatalogResult<Option<SearchMatch>> {
        let results = self.destination.search(query, filter).await?;
        Ok(results.into_iter().next())
    }

    /// List every source playlist with its first few track titles
    pub async fn preview_playlists(&self) -> CatalogResult<Vec<PlaylistPreview>> {
        let playlists = self.source.all_playlists().await?;
        let mut previews = Vec::with_capacity(playlists.len());

        for playlist in playlists {
            let first_page = self.source.playlist_tracks_page(&playlist.id, 0).await?;
            let sample_titles = first_page
                .items
                .into_iter()
                .take(PREVIEW_SAMPLE_SIZE)
                .map(|track| track.title)
                .collect();
            previews.push(PlaylistPreview {
                name: playlist.name,
                sample_titles,
                track_count: playlist.track_count,
            });
        }

        Ok(previews)
    }
}
