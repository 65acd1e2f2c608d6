use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::catalog::DestinationCatalog;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{DestinationPlaylist, LikedSong, SearchFilter, SearchMatch, Subscription};
use crate::utils::strip_html;
use crate::ytmusic_headers::{BrowserHeaders, YTM_ORIGIN};
use crate::ytmusic_parser::{self as parser, Continuation};

const YTM_BASE_API: &str = "https://music.youtube.com/youtubei/v1/";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:88.0) Gecko/20100101 Firefox/88.0";

const LIBRARY_PLAYLISTS: &str = "FEmusic_liked_playlists";
const LIKED_SONGS: &str = "VLLM";
const LIKED_VIDEOS: &str = "FEmusic_liked_videos";
const LIBRARY_ARTISTS: &str = "FEmusic_library_corpus_artists";

const SONGS_SEARCH_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const ARTISTS_SEARCH_PARAMS: &str = "EgWKAQIgAWoMEA4QChADEAQQCRAF";

/// Client version sent in the request context, derived from today's date
fn client_version() -> String {
    format!("1.{}.01.00", chrono::Utc::now().format("%Y%m%d"))
}

fn search_params(filter: SearchFilter) -> &'static str {
    match filter {
        SearchFilter::Songs => SONGS_SEARCH_PARAMS,
        SearchFilter::Artists => ARTISTS_SEARCH_PARAMS,
    }
}

/// Body and extra query parameters for the follow-up request of a shelf
fn continuation_request(body: &Value, token: &Continuation) -> (Value, Vec<(&'static str, String)>) {
    match token {
        Continuation::Legacy(token) => (
            body.clone(),
            vec![
                ("ctoken", token.clone()),
                ("continuation", token.clone()),
                ("type", "next".to_string()),
            ],
        ),
        Continuation::Command(token) => (json!({ "continuation": token }), Vec::new()),
    }
}

/// Error message carried in a YouTube error body, if any
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// YouTube Music library access through the `youtubei/v1` endpoints,
/// authenticated with pasted browser headers
pub struct YtMusicClient {
    http_client: Client,
    headers: BrowserHeaders,
    language: String,
    /// Endpoint prefix, ending in `/`
    base_url: String,
}

impl YtMusicClient {
    /// Create a new YtMusicClient instance
    pub fn new(headers: BrowserHeaders, language: impl Into<String>) -> Self {
        Self::with_base_url(headers, language, YTM_BASE_API)
    }

    /// Client sending its requests below `base_url` instead of the public API
    pub fn with_base_url(
        headers: BrowserHeaders,
        language: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: Client::new(),
            headers,
            language: language.into(),
            base_url: base_url.into(),
        }
    }

    fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": "WEB_REMIX",
                "clientVersion": client_version(),
                "hl": self.language,
            },
            "user": {},
        })
    }

    fn build_headers(&self, timestamp: i64) -> CatalogResult<HeaderMap> {
        let invalid = |name: &str| {
            CatalogError::AuthenticationFailed(format!("Stored header {} is not valid", name))
        };

        let mut headers = HeaderMap::new();
        for (name, value) in self.headers.iter() {
            if name == "authorization" {
                continue;
            }
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid(name))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid(name))?;
            headers.insert(header_name, header_value);
        }

        let authorization = self
            .headers
            .authorization(timestamp)
            .map_err(|e| CatalogError::AuthenticationFailed(e.to_string()))?;
        headers.insert(
            "authorization",
            HeaderValue::from_str(&authorization).map_err(|_| invalid("authorization"))?,
        );
        headers.insert("origin", HeaderValue::from_static(YTM_ORIGIN));
        headers.insert("x-origin", HeaderValue::from_static(YTM_ORIGIN));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if !headers.contains_key("user-agent") {
            headers.insert("user-agent", HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        if !headers.contains_key("x-goog-authuser") {
            headers.insert("x-goog-authuser", HeaderValue::from_static("0"));
        }
        Ok(headers)
    }

    async fn send(
        &self,
        endpoint: &str,
        mut body: Value,
        query: &[(&str, String)],
    ) -> CatalogResult<Value> {
        if let Some(map) = body.as_object_mut() {
            map.insert("context".to_string(), self.context());
        }
        let headers = self.build_headers(chrono::Utc::now().timestamp())?;

        debug!("POST youtubei/v1/{}", endpoint);
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, endpoint))
            .query(&[("alt", "json")])
            .query(query)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0);
            return Err(CatalogError::RateLimitExceeded {
                retry_after_ms: retry_after_secs * 1000,
            });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text).unwrap_or(text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    CatalogError::AuthenticationFailed(message)
                }
                _ => CatalogError::ApiRequestFailed {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Every item of a browse shelf, following continuations to the end
    async fn collect_shelf<T>(
        &self,
        browse_id: &str,
        renderers: &[&str],
        parse: fn(&Value) -> Option<T>,
    ) -> CatalogResult<Vec<T>> {
        let body = json!({ "browseId": browse_id });
        let response = self.send("browse", body.clone(), &[]).await?;

        let Some(shelf) = renderers
            .iter()
            .find_map(|renderer| parser::first_shelf(&response, renderer))
        else {
            return Ok(Vec::new());
        };
        let mut items: Vec<T> = shelf.items.into_iter().filter_map(parse).collect();
        let mut continuation = shelf.continuation;

        while let Some(token) = continuation.take() {
            let (next_body, query) = continuation_request(&body, &token);
            let response = self.send("browse", next_body, &query).await?;
            let Some(shelf) = parser::continuation_shelf(&response) else {
                break;
            };
            items.extend(shelf.items.into_iter().filter_map(parse));
            continuation = shelf.continuation.filter(|next| *next != token);
        }

        debug!("Browsed {} items from {}", items.len(), browse_id);
        Ok(items)
    }

    /// Check that the stored headers still authenticate
    pub async fn verify(&self) -> CatalogResult<()> {
        self.send("browse", json!({ "browseId": LIKED_VIDEOS }), &[])
            .await
            .map(|_| ())
    }
}

impl DestinationCatalog for YtMusicClient {
    async fn library_playlists(&self) -> CatalogResult<Vec<DestinationPlaylist>> {
        self.collect_shelf(LIBRARY_PLAYLISTS, &["gridRenderer"], parser::library_playlist)
            .await
    }

    async fn create_playlist(&self, name: &str, description: &str) -> CatalogResult<String> {
        let body = json!({
            "title": name,
            "description": strip_html(description),
            "privacyStatus": "PRIVATE",
        });
        let response = self.send("playlist/create", body, &[]).await?;
        parser::created_playlist_id(&response).ok_or_else(|| {
            CatalogError::UnexpectedResponse(format!("No playlist ID returned for {}", name))
        })
    }

    async fn delete_playlist(&self, playlist_id: &str) -> CatalogResult<()> {
        let playlist_id = playlist_id.strip_prefix("VL").unwrap_or(playlist_id);
        self.send("playlist/delete", json!({ "playlistId": playlist_id }), &[])
            .await
            .map(|_| ())
    }

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        item_ids: &[String],
    ) -> CatalogResult<()> {
        if item_ids.is_empty() {
            return Ok(());
        }
        let actions: Vec<Value> = item_ids
            .iter()
            .map(|id| {
                json!({
                    "action": "ACTION_ADD_VIDEO",
                    "addedVideoId": id,
                    "dedupeOption": "DEDUPE_OPTION_SKIP",
                })
            })
            .collect();
        let body = json!({ "playlistId": playlist_id, "actions": actions });

        let response = self.send("browse/edit_playlist", body, &[]).await?;
        if parser::edit_succeeded(&response) {
            Ok(())
        } else {
            Err(CatalogError::ApiRequestFailed {
                status: 200,
                message: response
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("playlist edit was not applied")
                    .to_string(),
            })
        }
    }

    async fn liked_songs(&self) -> CatalogResult<Vec<LikedSong>> {
        self.collect_shelf(
            LIKED_SONGS,
            &["musicPlaylistShelfRenderer", "musicShelfRenderer"],
            parser::liked_song,
        )
        .await
    }

    async fn like_song(&self, song_id: &str) -> CatalogResult<()> {
        self.send("like/like", json!({ "target": { "videoId": song_id } }), &[])
            .await
            .map(|_| ())
    }

    async fn subscriptions(&self) -> CatalogResult<Vec<Subscription>> {
        self.collect_shelf(LIBRARY_ARTISTS, &["musicShelfRenderer"], parser::subscription)
            .await
    }

    async fn subscribe_artist(&self, channel_id: &str) -> CatalogResult<()> {
        self.send(
            "subscription/subscribe",
            json!({ "channelIds": [channel_id] }),
            &[],
        )
        .await
        .map(|_| ())
    }

    async fn search(&self, query: &str, filter: SearchFilter) -> CatalogResult<Vec<SearchMatch>> {
        let body = json!({ "query": query, "params": search_params(filter) });
        let response = self.send("search", body, &[]).await?;
        Ok(parser::search_results(&response, filter))
    }
}
