//! Extraction of library items from YouTube Music `youtubei/v1` responses.
//!
//! The responses are deeply nested renderer trees. Containers are located
//! with a depth-first key search, individual fields with JSON pointers.

use serde_json::Value;

use crate::models::{DestinationPlaylist, LikedSong, SearchFilter, SearchMatch, Subscription};
use crate::utils::parse_item_count;

const TITLE_RUN: &str = "/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0/text";
const SUBTITLE_RUN: &str =
    "/flexColumns/1/musicResponsiveListItemFlexColumnRenderer/text/runs/0/text";
const PLAY_BUTTON_VIDEO_ID: &str = "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId";

/// Token for fetching the next chunk of a shelf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// `nextContinuationData`, sent back as `ctoken`/`continuation` query parameters
    Legacy(String),
    /// `continuationCommand`, sent back as `continuation` in the request body
    Command(String),
}

/// Items of one shelf chunk plus the token for the next chunk, if any
#[derive(Debug, Clone)]
pub struct ShelfPage<'v> {
    pub items: Vec<&'v Value>,
    pub continuation: Option<Continuation>,
}

/// Depth-first search for the first value stored under `key`
pub fn find_key<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

fn pointer_str<'v>(value: &'v Value, pointer: &str) -> Option<&'v str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn command_continuation(item: &Value) -> Option<String> {
    pointer_str(
        item,
        "/continuationItemRenderer/continuationEndpoint/continuationCommand/token",
    )
    .map(str::to_string)
}

fn shelf_from_items<'v>(items: &'v Value, mut continuation: Option<Continuation>) -> ShelfPage<'v> {
    let mut page_items = Vec::new();
    for item in items.as_array().into_iter().flatten() {
        match command_continuation(item) {
            Some(token) => continuation = Some(Continuation::Command(token)),
            None => page_items.push(item),
        }
    }
    ShelfPage {
        items: page_items,
        continuation,
    }
}

fn shelf_from_renderer(renderer: &Value) -> ShelfPage<'_> {
    let legacy = pointer_str(renderer, "/continuations/0/nextContinuationData/continuation")
        .map(|token| Continuation::Legacy(token.to_string()));
    match renderer.get("contents").or_else(|| renderer.get("items")) {
        Some(items) => shelf_from_items(items, legacy),
        None => ShelfPage {
            items: Vec::new(),
            continuation: legacy,
        },
    }
}

/// First shelf rendered by `renderer` (e.g. `musicShelfRenderer`) in a browse
/// or search response
pub fn first_shelf<'v>(response: &'v Value, renderer: &str) -> Option<ShelfPage<'v>> {
    find_key(response, renderer).map(shelf_from_renderer)
}

/// The chunk carried by a continuation response, in either format
pub fn continuation_shelf(response: &Value) -> Option<ShelfPage<'_>> {
    if let Some(contents) = response.get("continuationContents").and_then(Value::as_object) {
        return contents.values().next().map(shelf_from_renderer);
    }
    response
        .pointer("/onResponseReceivedActions/0/appendContinuationItemsAction/continuationItems")
        .map(|items| shelf_from_items(items, None))
}

/// Playlist tile from the library playlists grid.
///
/// Tiles without a `VL` browse ID (the "New playlist" button) are skipped.
pub fn library_playlist(item: &Value) -> Option<DestinationPlaylist> {
    let renderer = item.get("musicTwoRowItemRenderer")?;
    let name = pointer_str(renderer, "/title/runs/0/text")?;
    let browse_id = pointer_str(renderer, "/navigationEndpoint/browseEndpoint/browseId")?;
    let id = browse_id.strip_prefix("VL")?;

    let subtitle: String = renderer
        .pointer("/subtitle/runs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();

    Some(DestinationPlaylist {
        id: id.to_string(),
        name: name.to_string(),
        track_count: parse_item_count(&subtitle),
    })
}

/// Song row from a playlist shelf or a song search
pub fn song_item(item: &Value) -> Option<SearchMatch> {
    let renderer = item.get("musicResponsiveListItemRenderer")?;
    let title = pointer_str(renderer, TITLE_RUN)?;
    let artist = pointer_str(renderer, SUBTITLE_RUN).unwrap_or_default();
    let video_id = pointer_str(renderer, "/playlistItemData/videoId")
        .or_else(|| pointer_str(renderer, PLAY_BUTTON_VIDEO_ID))?;

    Some(SearchMatch {
        id: video_id.to_string(),
        artist_name: artist.to_string(),
        title: title.to_string(),
    })
}

/// Artist row from an artist search or the subscriptions shelf.
/// `id` is the channel ID, both name fields hold the channel title.
pub fn artist_item(item: &Value) -> Option<SearchMatch> {
    let renderer = item.get("musicResponsiveListItemRenderer")?;
    let name = pointer_str(renderer, TITLE_RUN)?;
    let channel_id = pointer_str(renderer, "/navigationEndpoint/browseEndpoint/browseId")?;

    Some(SearchMatch {
        id: channel_id.to_string(),
        artist_name: name.to_string(),
        title: name.to_string(),
    })
}

pub fn liked_song(item: &Value) -> Option<LikedSong> {
    song_item(item).map(|song| LikedSong {
        id: song.id,
        artist_name: song.artist_name,
        title: song.title,
    })
}

pub fn subscription(item: &Value) -> Option<Subscription> {
    artist_item(item).map(|artist| Subscription {
        channel_id: artist.id,
        name: artist.artist_name,
    })
}

/// Ranked candidates of a filtered search. No shelf means no results.
pub fn search_results(response: &Value, filter: SearchFilter) -> Vec<SearchMatch> {
    let Some(shelf) = first_shelf(response, "musicShelfRenderer") else {
        return Vec::new();
    };
    let parse = match filter {
        SearchFilter::Songs => song_item,
        SearchFilter::Artists => artist_item,
    };
    shelf.items.into_iter().filter_map(parse).collect()
}

pub fn created_playlist_id(response: &Value) -> Option<String> {
    response
        .get("playlistId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `browse/edit_playlist` reports `STATUS_SUCCEEDED` on success
pub fn edit_succeeded(response: &Value) -> bool {
    response
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| status.contains("SUCCEEDED"))
}
