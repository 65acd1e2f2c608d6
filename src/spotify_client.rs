use log::warn;
use rspotify::http::HttpError;
use rspotify::model::{PlayableItem, PlaylistId, SimplifiedArtist, SimplifiedPlaylist};
use rspotify::prelude::*;
use rspotify::{AuthCodeSpotify, ClientError};

use crate::catalog::{Page, SourceCatalog};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{FollowedArtist, LikedSongEntry, SourcePlaylist, TrackRef};

impl From<ClientError> for CatalogError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(http) => match *http {
                HttpError::StatusCode(response) => {
                    let status = response.status().as_u16();
                    match status {
                        429 => {
                            let retry_after_secs = response
                                .headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(0);
                            CatalogError::RateLimitExceeded {
                                retry_after_ms: retry_after_secs * 1000,
                            }
                        }
                        401 | 403 => CatalogError::AuthenticationFailed(format!(
                            "Spotify rejected the request with status {}",
                            status
                        )),
                        404 => CatalogError::NotFound(response.url().to_string()),
                        _ => CatalogError::ApiRequestFailed {
                            status,
                            message: format!("Spotify request to {} failed", response.url()),
                        },
                    }
                }
                HttpError::Client(e) => CatalogError::from(e),
            },
            ClientError::InvalidToken => {
                CatalogError::AuthenticationFailed("Spotify token is not valid".to_string())
            }
            ClientError::ParseJson(e) => CatalogError::JsonParsingError(e.to_string()),
            other => CatalogError::UnexpectedResponse(other.to_string()),
        }
    }
}

/// Primary artist and title of a track
fn track_ref(artists: &[SimplifiedArtist], title: &str) -> TrackRef {
    let artist = artists.first().map(|a| a.name.clone()).unwrap_or_default();
    TrackRef::new(artist, title)
}

/// Fetched description, or empty when the fetch failed
fn description_or_empty(name: &str, fetched: Result<Option<String>, ClientError>) -> String {
    match fetched {
        Ok(description) => description.unwrap_or_default(),
        Err(e) => {
            warn!("Could not fetch description of Spotify playlist {}: {}", name, e);
            String::new()
        }
    }
}

fn source_playlist(playlist: SimplifiedPlaylist, description: String) -> SourcePlaylist {
    SourcePlaylist {
        id: playlist.id.id().to_string(),
        name: playlist.name,
        description,
        track_count: playlist.tracks.total as usize,
    }
}

/// Read-only Spotify library access on top of an authorized rspotify client
pub struct SpotifyClient {
    client: AuthCodeSpotify,
    page_size: u32,
}

impl SpotifyClient {
    /// Create a new SpotifyClient instance
    pub fn new(client: AuthCodeSpotify, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// ID of the authorized user, used to verify the token works
    pub async fn current_user_id(&self) -> CatalogResult<String> {
        let user = self.client.me().await?;
        Ok(user.id.id().to_string())
    }

    async fn playlist_description(&self, playlist: &SimplifiedPlaylist) -> String {
        // Simplified playlists carry no description.
        let fetched = self
            .client
            .playlist(playlist.id.clone(), None, None)
            .await
            .map(|full| full.description);
        description_or_empty(&playlist.name, fetched)
    }
}

impl SourceCatalog for SpotifyClient {
    async fn playlists_page(&self, offset: u32) -> CatalogResult<Page<SourcePlaylist>> {
        log::debug!("Fetching Spotify playlists at offset {}", offset);
        let page = self
            .client
            .current_user_playlists_manual(Some(self.page_size), Some(offset))
            .await?;

        let has_next = page.next.is_some();
        let mut playlists = Vec::with_capacity(page.items.len());
        for playlist in page.items {
            let description = self.playlist_description(&playlist).await;
            playlists.push(source_playlist(playlist, description));
        }
        Ok(Page::new(playlists, has_next))
    }

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        offset: u32,
    ) -> CatalogResult<Page<TrackRef>> {
        let id = PlaylistId::from_id(playlist_id)
            .map_err(|_| CatalogError::NotFound(format!("Spotify playlist {}", playlist_id)))?;
        let page = self
            .client
            .playlist_items_manual(id, None, None, Some(self.page_size), Some(offset))
            .await?;

        let has_next = page.next.is_some();
        let received = page.items.len();
        let tracks = page
            .items
            .into_iter()
            .filter_map(|item| match item.track {
                Some(PlayableItem::Track(track)) => Some(track_ref(&track.artists, &track.name)),
                Some(PlayableItem::Episode(episode)) => {
                    Some(TrackRef::new(episode.show.publisher, episode.name))
                }
                _ => None,
            })
            .collect();
        Ok(Page::filtered(tracks, received, has_next))
    }

    async fn saved_tracks_page(&self, offset: u32) -> CatalogResult<Page<LikedSongEntry>> {
        let page = self
            .client
            .current_user_saved_tracks_manual(None, Some(self.page_size), Some(offset))
            .await?;

        let has_next = page.next.is_some();
        let tracks = page
            .items
            .iter()
            .map(|saved| track_ref(&saved.track.artists, &saved.track.name))
            .collect();
        Ok(Page::new(tracks, has_next))
    }

    async fn followed_artists_page(
        &self,
        after: Option<&str>,
    ) -> CatalogResult<Page<FollowedArtist>> {
        let page = self
            .client
            .current_user_followed_artists(after, Some(self.page_size))
            .await?;

        let has_next = page.next.is_some();
        let artists = page
            .items
            .into_iter()
            .map(|artist| FollowedArtist {
                id: artist.id.id().to_string(),
                name: artist.name,
            })
            .collect();
        Ok(Page::new(artists, has_next))
    }
}
