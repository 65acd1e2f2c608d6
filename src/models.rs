use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CatalogError;
use crate::utils::search_query;

/// A track reference as the source catalog describes it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TrackRef {
    /// Primary (first listed) artist name
    pub artist_name: String,
    /// Track title
    pub title: String,
}

impl TrackRef {
    /// Create a new TrackRef instance
    pub fn new(artist_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist_name: artist_name.into(),
            title: title.into(),
        }
    }

    /// Free-text query used against the destination search
    pub fn search_query(&self) -> String {
        search_query(&self.artist_name, &self.title)
    }
}

/// Saved (liked) tracks carry the same fields as playlist entries.
pub type LikedSongEntry = TrackRef;

/// Playlist owned or followed in the source library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcePlaylist {
    /// Source catalog playlist ID
    pub id: String,
    /// Display name, the matching key against the destination library
    pub name: String,
    /// Playlist description (may be empty)
    pub description: String,
    /// Number of items the source reports for this playlist
    pub track_count: usize,
}

/// Artist followed in the source library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowedArtist {
    /// Source catalog artist ID, also the pagination cursor
    pub id: String,
    pub name: String,
}

impl FollowedArtist {
    /// Query used to find the artist's auto-generated topic channel
    pub fn topic_query(&self) -> String {
        format!("{} - Topic", self.name)
    }
}

/// Playlist present in the destination library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DestinationPlaylist {
    pub id: String,
    pub name: String,
    /// `None` when the destination did not report a count
    pub track_count: Option<usize>,
}

/// Song already liked in the destination library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LikedSong {
    pub id: String,
    pub artist_name: String,
    pub title: String,
}

impl LikedSong {
    /// Composite identity used to detect already-liked songs
    pub fn identity(&self) -> String {
        search_query(&self.artist_name, &self.title)
    }
}

/// Channel the destination account is subscribed to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub channel_id: String,
    /// Channel display name
    pub name: String,
}

/// Result type filter for destination searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchFilter {
    Songs,
    Artists,
}

/// Destination-side search candidate.
///
/// For artist searches `id` is the channel ID and `artist_name` the
/// channel title; `title` repeats the channel title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchMatch {
    pub id: String,
    pub artist_name: String,
    pub title: String,
}

impl SearchMatch {
    /// Composite identity, comparable with [`LikedSong::identity`]
    pub fn identity(&self) -> String {
        search_query(&self.artist_name, &self.title)
    }
}

/// Outcome of reconciling a single source item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Item was created at the destination
    Added,
    /// Destination already had an equivalent item
    AlreadyPresent,
    /// Search returned no candidate
    NotFound,
    /// The search itself failed, so nothing was attempted
    SearchFailed(CatalogError),
    /// Creating the item at the destination failed
    Failed(CatalogError),
}

/// Summary of a playlist transfer batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistTransferReport {
    /// Playlists created because no same-named playlist existed
    pub created: usize,
    /// Stale playlists deleted and created again
    pub recreated: usize,
    /// Playlists whose name and track count already matched
    pub skipped: usize,
    /// Playlists that could not be created (or deleted/read)
    pub failed_playlists: usize,
    pub tracks_added: usize,
    pub tracks_not_found: usize,
    /// Tracks whose add call failed
    pub failed_tracks: usize,
    /// Tracks whose search failed; these do not make the batch fail
    pub failed_searches: usize,
    /// Whether any recorded failure was the destination throttling us
    pub rate_limited: bool,
}

impl PlaylistTransferReport {
    /// True when no create or add failed across the whole batch
    pub fn is_error_free(&self) -> bool {
        self.failed_playlists == 0 && self.failed_tracks == 0
    }

    /// Count a playlist that could not be deleted, created or read
    pub fn record_playlist_failure(&mut self, err: &CatalogError) {
        self.failed_playlists += 1;
        self.rate_limited |= err.is_rate_limited();
    }

    pub fn record_track(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Added | ItemOutcome::AlreadyPresent => self.tracks_added += 1,
            ItemOutcome::NotFound => self.tracks_not_found += 1,
            ItemOutcome::SearchFailed(_) => self.failed_searches += 1,
            ItemOutcome::Failed(err) => {
                self.failed_tracks += 1;
                self.rate_limited |= err.is_rate_limited();
            }
        }
    }

    /// Human-readable summary printed after the batch
    pub fn format_summary(&self) -> String {
        let headline = if self.is_error_free() {
            "All playlists successfully transferred from Spotify to YouTube Music!"
        } else if self.rate_limited {
            "Some playlists could not be transferred from Spotify to YouTube Music. \
            This is probably because YouTube complained about you creating too many playlists too quickly. \
            Try running the transfer again after some time has passed to continue the process."
        } else {
            "Some playlists could not be transferred from Spotify to YouTube Music. \
            Check the log for the errors and run the transfer again to continue the process."
        };

        format!(
            "{}\n\
            Playlists: {} created, {} recreated, {} skipped, {} failed\n\
            Tracks: {} added, {} not found, {} failed, {} searches failed",
            headline,
            self.created,
            self.recreated,
            self.skipped,
            self.failed_playlists,
            self.tracks_added,
            self.tracks_not_found,
            self.failed_tracks,
            self.failed_searches
        )
    }
}

/// Summary of a liked-songs transfer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LikedSongsReport {
    pub liked: usize,
    pub already_liked: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl LikedSongsReport {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Added => self.liked += 1,
            ItemOutcome::AlreadyPresent => self.already_liked += 1,
            ItemOutcome::NotFound => self.not_found += 1,
            ItemOutcome::SearchFailed(_) | ItemOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Liked songs: {} liked, {} already liked, {} not found, {} failed",
            self.liked, self.already_liked, self.not_found, self.failed
        )
    }
}

/// Summary of a followed-artists transfer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowedArtistsReport {
    pub subscribed: usize,
    pub already_subscribed: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl FollowedArtistsReport {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Added => self.subscribed += 1,
            ItemOutcome::AlreadyPresent => self.already_subscribed += 1,
            ItemOutcome::NotFound => self.not_found += 1,
            ItemOutcome::SearchFailed(_) | ItemOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Artists: {} subscribed, {} already subscribed, {} not found, {} failed",
            self.subscribed, self.already_subscribed, self.not_found, self.failed
        )
    }
}

/// Short listing of a source playlist used by the preview command
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistPreview {
    pub name: String,
    pub sample_titles: Vec<String>,
    pub track_count: usize,
}

impl PlaylistPreview {
    pub fn format_preview(&self) -> String {
        let mut lines = vec![self.name.clone()];
        for title in &self.sample_titles {
            lines.push(format!(" - {}", title));
        }
        if self.track_count > self.sample_titles.len() {
            lines.push(format!(
                " - plus {} more tracks",
                self.track_count - self.sample_titles.len()
            ));
        }
        lines.join("\n")
    }
}

/// Stored Spotify application credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Configuration for the transfer tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// File holding the Spotify client ID and secret
    pub spotify_auth_file: PathBuf,
    /// Credentials taken from the environment, bypassing the file
    pub spotify_credentials: Option<SpotifyCredentials>,
    /// Redirect URI registered in the Spotify application settings
    pub spotify_redirect_uri: String,
    /// Where rspotify caches the OAuth token
    pub spotify_token_cache: PathBuf,
    /// Items requested per Spotify page (1..=50)
    pub spotify_page_size: u32,
    /// File holding the pasted YouTube Music browser headers
    pub ytmusic_headers_file: PathBuf,
    /// Interface language sent in the YouTube Music client context
    pub ytmusic_language: String,
}

impl TransferConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            spotify_auth_file: PathBuf::from("spotify_auth.json"),
            spotify_credentials: None,
            spotify_redirect_uri: "http://localhost/".to_string(),
            spotify_token_cache: PathBuf::from(".spotify_token_cache.json"),
            spotify_page_size: 50,
            ytmusic_headers_file: PathBuf::from("ytmusic_headers_auth.json"),
            ytmusic_language: "en".to_string(),
        }
    }

    /// Validate that all fields hold usable values
    pub fn validate(&self) -> Result<(), String> {
        if self.spotify_redirect_uri.is_empty() {
            return Err("Spotify redirect URI is required".to_string());
        }
        if url::Url::parse(&self.spotify_redirect_uri).is_err() {
            return Err(format!(
                "Spotify redirect URI is not a valid URL: {}",
                self.spotify_redirect_uri
            ));
        }
        if self.spotify_page_size == 0 || self.spotify_page_size > 50 {
            return Err("Spotify page size must be between 1 and 50".to_string());
        }
        if let Some(credentials) = &self.spotify_credentials {
            if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
                return Err("Spotify client ID and secret must both be set".to_string());
            }
        }
        if self.ytmusic_language.is_empty() {
            return Err("YouTube Music language is required".to_string());
        }

        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new()
    }
}
