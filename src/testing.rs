//! In-memory catalogs for exercising the reconciler without a network.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::catalog::{DestinationCatalog, Page, SourceCatalog};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    DestinationPlaylist, FollowedArtist, LikedSong, LikedSongEntry, SearchFilter, SearchMatch,
    SourcePlaylist, Subscription, TrackRef,
};

fn page_of<T: Clone>(items: &[T], offset: usize, page_size: usize) -> Page<T> {
    let start = offset.min(items.len());
    let end = (start + page_size).min(items.len());
    Page::new(items[start..end].to_vec(), end < items.len())
}

pub(crate) struct FakeSource {
    page_size: usize,
    /// `None` entries stand for items the source cannot resolve to a track
    playlists: Vec<(SourcePlaylist, Vec<Option<TrackRef>>)>,
    saved: Vec<LikedSongEntry>,
    artists: Vec<FollowedArtist>,
    unreadable_playlists: HashSet<String>,
    track_offsets: RefCell<Vec<u32>>,
    cursors: RefCell<Vec<Option<String>>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self {
            page_size: 50,
            playlists: Vec::new(),
            saved: Vec::new(),
            artists: Vec::new(),
            unreadable_playlists: HashSet::new(),
            track_offsets: RefCell::new(Vec::new()),
            cursors: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub(crate) fn with_playlist(
        self,
        id: &str,
        name: &str,
        description: &str,
        tracks: Vec<TrackRef>,
    ) -> Self {
        let count = tracks.len();
        self.with_playlist_reporting(id, name, description, count, tracks)
    }

    /// Playlist with unavailable entries that pages return but drop
    pub(crate) fn with_playlist_entries(
        mut self,
        id: &str,
        name: &str,
        entries: Vec<Option<TrackRef>>,
    ) -> Self {
        let playlist = SourcePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            track_count: entries.len(),
        };
        self.playlists.push((playlist, entries));
        self
    }

    /// Playlist whose reported count differs from what its pages return
    pub(crate) fn with_playlist_reporting(
        mut self,
        id: &str,
        name: &str,
        description: &str,
        track_count: usize,
        tracks: Vec<TrackRef>,
    ) -> Self {
        let playlist = SourcePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            track_count,
        };
        self.playlists
            .push((playlist, tracks.into_iter().map(Some).collect()));
        self
    }

    pub(crate) fn with_unreadable_playlist(mut self, id: &str) -> Self {
        self.unreadable_playlists.insert(id.to_string());
        self
    }

    pub(crate) fn with_saved_track(mut self, artist: &str, title: &str) -> Self {
        self.saved.push(TrackRef::new(artist, title));
        self
    }

    pub(crate) fn with_followed_artist(mut self, id: &str, name: &str) -> Self {
        self.artists.push(FollowedArtist {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub(crate) fn requested_offsets(&self) -> Vec<u32> {
        self.track_offsets.borrow().clone()
    }

    pub(crate) fn requested_cursors(&self) -> Vec<Option<String>> {
        self.cursors.borrow().clone()
    }
}

impl SourceCatalog for FakeSource {
    async fn playlists_page(&self, offset: u32) -> CatalogResult<Page<SourcePlaylist>> {
        let playlists: Vec<SourcePlaylist> =
            self.playlists.iter().map(|(p, _)| p.clone()).collect();
        Ok(page_of(&playlists, offset as usize, self.page_size))
    }

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        offset: u32,
    ) -> CatalogResult<Page<TrackRef>> {
        self.track_offsets.borrow_mut().push(offset);
        if self.unreadable_playlists.contains(playlist_id) {
            return Err(CatalogError::ApiRequestFailed {
                status: 500,
                message: "playlist unavailable".to_string(),
            });
        }
        let (_, entries) = self
            .playlists
            .iter()
            .find(|(p, _)| p.id == playlist_id)
            .ok_or_else(|| CatalogError::NotFound(playlist_id.to_string()))?;
        let page = page_of(entries, offset as usize, self.page_size);
        let received = page.received;
        let tracks = page.items.into_iter().flatten().collect();
        Ok(Page::filtered(tracks, received, page.has_next))
    }

    async fn saved_tracks_page(&self, offset: u32) -> CatalogResult<Page<LikedSongEntry>> {
        Ok(page_of(&self.saved, offset as usize, self.page_size))
    }

    async fn followed_artists_page(
        &self,
        after: Option<&str>,
    ) -> CatalogResult<Page<FollowedArtist>> {
        self.cursors.borrow_mut().push(after.map(str::to_string));
        let start = match after {
            Some(id) => self
                .artists
                .iter()
                .position(|a| a.id == id)
                .map_or(self.artists.len(), |i| i + 1),
            None => 0,
        };
        Ok(page_of(&self.artists, start, self.page_size))
    }
}

/// Mutation or search issued against the fake destination
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create { name: String, description: String },
    Delete(String),
    Add { playlist_id: String, item_ids: Vec<String> },
    Like(String),
    Subscribe(String),
    Search { query: String, filter: SearchFilter },
}

pub(crate) struct FakeDestination {
    playlists: RefCell<Vec<DestinationPlaylist>>,
    playlist_items: RefCell<HashMap<String, Vec<String>>>,
    liked: RefCell<Vec<LikedSong>>,
    subscriptions: RefCell<Vec<Subscription>>,
    results: HashMap<(String, SearchFilter), Vec<SearchMatch>>,
    fail_create: HashSet<String>,
    fail_delete: HashSet<String>,
    fail_add: HashSet<String>,
    fail_like: HashSet<String>,
    fail_search: HashSet<String>,
    calls: RefCell<Vec<Call>>,
    next_id: Cell<usize>,
}

impl FakeDestination {
    pub(crate) fn new() -> Self {
        Self {
            playlists: RefCell::new(Vec::new()),
            playlist_items: RefCell::new(HashMap::new()),
            liked: RefCell::new(Vec::new()),
            subscriptions: RefCell::new(Vec::new()),
            results: HashMap::new(),
            fail_create: HashSet::new(),
            fail_delete: HashSet::new(),
            fail_add: HashSet::new(),
            fail_like: HashSet::new(),
            fail_search: HashSet::new(),
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub(crate) fn with_playlist(self, id: &str, name: &str, track_count: Option<usize>) -> Self {
        self.playlists.borrow_mut().push(DestinationPlaylist {
            id: id.to_string(),
            name: name.to_string(),
            track_count,
        });
        self
    }

    pub(crate) fn with_liked(self, id: &str, artist: &str, title: &str) -> Self {
        self.liked.borrow_mut().push(LikedSong {
            id: id.to_string(),
            artist_name: artist.to_string(),
            title: title.to_string(),
        });
        self
    }

    pub(crate) fn with_subscription(self, channel_id: &str, name: &str) -> Self {
        self.subscriptions.borrow_mut().push(Subscription {
            channel_id: channel_id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub(crate) fn with_song_result(mut self, query: &str, id: &str, artist: &str, title: &str) -> Self {
        self.results
            .entry((query.to_string(), SearchFilter::Songs))
            .or_default()
            .push(SearchMatch {
                id: id.to_string(),
                artist_name: artist.to_string(),
                title: title.to_string(),
            });
        self
    }

    pub(crate) fn with_artist_result(mut self, query: &str, channel_id: &str, name: &str) -> Self {
        self.results
            .entry((query.to_string(), SearchFilter::Artists))
            .or_default()
            .push(SearchMatch {
                id: channel_id.to_string(),
                artist_name: name.to_string(),
                title: name.to_string(),
            });
        self
    }

    pub(crate) fn failing_create(mut self, name: &str) -> Self {
        self.fail_create.insert(name.to_string());
        self
    }

    pub(crate) fn failing_delete(mut self, playlist_id: &str) -> Self {
        self.fail_delete.insert(playlist_id.to_string());
        self
    }

    pub(crate) fn failing_add(mut self, item_id: &str) -> Self {
        self.fail_add.insert(item_id.to_string());
        self
    }

    pub(crate) fn failing_like(mut self, song_id: &str) -> Self {
        self.fail_like.insert(song_id.to_string());
        self
    }

    pub(crate) fn failing_search(mut self, query: &str) -> Self {
        self.fail_search.insert(query.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    pub(crate) fn playlist_items(&self, playlist_id: &str) -> Vec<String> {
        self.playlist_items
            .borrow()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn playlist_names(&self) -> Vec<String> {
        self.playlists.borrow().iter().map(|p| p.name.clone()).collect()
    }

    fn find_result(&self, id: &str, filter: SearchFilter) -> Option<SearchMatch> {
        self.results
            .iter()
            .filter(|((_, f), _)| *f == filter)
            .flat_map(|(_, matches)| matches.iter())
            .find(|m| m.id == id)
            .cloned()
    }

    fn rate_limited() -> CatalogError {
        CatalogError::RateLimitExceeded { retry_after_ms: 0 }
    }
}

impl DestinationCatalog for FakeDestination {
    async fn library_playlists(&self) -> CatalogResult<Vec<DestinationPlaylist>> {
        Ok(self.playlists.borrow().clone())
    }

    async fn create_playlist(&self, name: &str, description: &str) -> CatalogResult<String> {
        self.calls.borrow_mut().push(Call::Create {
            name: name.to_string(),
            description: description.to_string(),
        });
        if self.fail_create.contains(name) {
            return Err(Self::rate_limited());
        }
        let id = format!("ytpl{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.playlists.borrow_mut().push(DestinationPlaylist {
            id: id.clone(),
            name: name.to_string(),
            track_count: Some(0),
        });
        Ok(id)
    }

    async fn delete_playlist(&self, playlist_id: &str) -> CatalogResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(playlist_id.to_string()));
        if self.fail_delete.contains(playlist_id) {
            return Err(Self::rate_limited());
        }
        self.playlists.borrow_mut().retain(|p| p.id != playlist_id);
        self.playlist_items.borrow_mut().remove(playlist_id);
        Ok(())
    }

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        item_ids: &[String],
    ) -> CatalogResult<()> {
        self.calls.borrow_mut().push(Call::Add {
            playlist_id: playlist_id.to_string(),
            item_ids: item_ids.to_vec(),
        });
        if item_ids.iter().any(|id| self.fail_add.contains(id)) {
            return Err(Self::rate_limited());
        }
        let mut items = self.playlist_items.borrow_mut();
        let entries = items.entry(playlist_id.to_string()).or_default();
        for id in item_ids {
            if !entries.contains(id) {
                entries.push(id.clone());
            }
        }
        let count = entries.len();
        if let Some(playlist) = self
            .playlists
            .borrow_mut()
            .iter_mut()
            .find(|p| p.id == playlist_id)
        {
            playlist.track_count = Some(count);
        }
        Ok(())
    }

    async fn liked_songs(&self) -> CatalogResult<Vec<LikedSong>> {
        Ok(self.liked.borrow().clone())
    }

    async fn like_song(&self, song_id: &str) -> CatalogResult<()> {
        self.calls.borrow_mut().push(Call::Like(song_id.to_string()));
        if self.fail_like.contains(song_id) {
            return Err(Self::rate_limited());
        }
        if let Some(found) = self.find_result(song_id, SearchFilter::Songs) {
            self.liked.borrow_mut().push(LikedSong {
                id: found.id,
                artist_name: found.artist_name,
                title: found.title,
            });
        }
        Ok(())
    }

    async fn subscriptions(&self) -> CatalogResult<Vec<Subscription>> {
        Ok(self.subscriptions.borrow().clone())
    }

    async fn subscribe_artist(&self, channel_id: &str) -> CatalogResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::Subscribe(channel_id.to_string()));
        if let Some(found) = self.find_result(channel_id, SearchFilter::Artists) {
            self.subscriptions.borrow_mut().push(Subscription {
                channel_id: found.id,
                name: found.artist_name,
            });
        }
        Ok(())
    }

    async fn search(&self, query: &str, filter: SearchFilter) -> CatalogResult<Vec<SearchMatch>> {
        self.calls.borrow_mut().push(Call::Search {
            query: query.to_string(),
            filter,
        });
        if self.fail_search.contains(query) {
            return Err(CatalogError::NetworkError("connection reset".to_string()));
        }
        Ok(self
            .results
            .get(&(query.to_string(), filter))
            .cloned()
            .unwrap_or_default())
    }
}
