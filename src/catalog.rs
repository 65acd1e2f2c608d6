//! Contracts for the two remote libraries the reconciler works between.
//!
//! The source side is read-only and paginated; the destination side is
//! read/write and hands back whole snapshots.

use crate::error::CatalogResult;
use crate::models::{
    DestinationPlaylist, FollowedArtist, LikedSong, LikedSongEntry, SearchFilter, SearchMatch,
    SourcePlaylist, Subscription, TrackRef,
};

/// One page of a paginated source listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Entries the remote returned, including ones dropped from `items`
    pub received: usize,
    /// Whether the remote reported another page after this one
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_next: bool) -> Self {
        let received = items.len();
        Self {
            items,
            received,
            has_next,
        }
    }

    /// Page whose remote listing held `received` entries, some of which
    /// were not convertible and left out of `items`
    pub fn filtered(items: Vec<T>, received: usize, has_next: bool) -> Self {
        Self {
            items,
            received,
            has_next,
        }
    }
}

/// Read access to the library being migrated from.
///
/// Implementors provide the page-level calls; the `all_*` methods walk
/// the pages. Offsets advance by the number of entries the remote
/// returned, not the number kept. The followed-artist cursor is the
/// last artist ID seen.
#[allow(async_fn_in_trait)]
pub trait SourceCatalog {
    async fn playlists_page(&self, offset: u32) -> CatalogResult<Page<SourcePlaylist>>;

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        offset: u32,
    ) -> CatalogResult<Page<TrackRef>>;

    async fn saved_tracks_page(&self, offset: u32) -> CatalogResult<Page<LikedSongEntry>>;

    async fn followed_artists_page(
        &self,
        after: Option<&str>,
    ) -> CatalogResult<Page<FollowedArtist>>;

    async fn all_playlists(&self) -> CatalogResult<Vec<SourcePlaylist>> {
        let mut playlists = Vec::new();
        let mut offset = 0u32;
        loop {
            let page = self.playlists_page(offset).await?;
            let received = page.received;
            playlists.extend(page.items);
            if !page.has_next || received == 0 {
                break;
            }
            offset += received as u32;
        }
        Ok(playlists)
    }

    async fn all_playlist_tracks(&self, playlist_id: &str) -> CatalogResult<Vec<TrackRef>> {
        let mut tracks = Vec::new();
        let mut offset = 0u32;
        loop {
            let page = self.playlist_tracks_page(playlist_id, offset).await?;
            let received = page.received;
            tracks.extend(page.items);
            if !page.has_next || received == 0 {
                break;
            }
            offset += received as u32;
        }
        Ok(tracks)
    }

    async fn all_saved_tracks(&self) -> CatalogResult<Vec<LikedSongEntry>> {
        let mut tracks = Vec::new();
        let mut offset = 0u32;
        loop {
            let page = self.saved_tracks_page(offset).await?;
            let received = page.received;
            tracks.extend(page.items);
            if !page.has_next || received == 0 {
                break;
            }
            offset += received as u32;
        }
        Ok(tracks)
    }

    async fn all_followed_artists(&self) -> CatalogResult<Vec<FollowedArtist>> {
        let mut artists: Vec<FollowedArtist> = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let page = self.followed_artists_page(after.as_deref()).await?;
            let Some(last) = page.items.last() else {
                break;
            };
            after = Some(last.id.clone());
            let has_next = page.has_next;
            artists.extend(page.items);
            if !has_next {
                break;
            }
        }
        Ok(artists)
    }
}

/// Read/write access to the library being migrated to
#[allow(async_fn_in_trait)]
pub trait DestinationCatalog {
    /// Every playlist in the library, continuations already followed
    async fn library_playlists(&self) -> CatalogResult<Vec<DestinationPlaylist>>;

    /// Create a playlist and return its ID
    async fn create_playlist(&self, name: &str, description: &str) -> CatalogResult<String>;

    async fn delete_playlist(&self, playlist_id: &str) -> CatalogResult<()>;

    /// Add items, letting the destination skip ones already present
    async fn add_playlist_items(&self, playlist_id: &str, item_ids: &[String])
        -> CatalogResult<()>;

    /// Every liked song, no limit
    async fn liked_songs(&self) -> CatalogResult<Vec<LikedSong>>;

    async fn like_song(&self, song_id: &str) -> CatalogResult<()>;

    /// Every channel subscription, no limit
    async fn subscriptions(&self) -> CatalogResult<Vec<Subscription>>;

    async fn subscribe_artist(&self, channel_id: &str) -> CatalogResult<()>;

    /// Candidates ranked by the destination's own relevance
    async fn search(&self, query: &str, filter: SearchFilter) -> CatalogResult<Vec<SearchMatch>>;
}
