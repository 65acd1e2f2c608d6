use regex::Regex;
use std::sync::OnceLock;

/// Build the `"{artist} - {title}"` string used both as a search query
/// and as the identity of a liked song.
pub fn search_query(artist: &str, title: &str) -> String {
    format!("{} - {}", artist, title)
}

/// Strip HTML tags and decode the handful of entities Spotify puts in
/// playlist descriptions. YouTube Music rejects descriptions with markup.
pub fn strip_html(text: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

    tag_re
        .replace_all(text, "")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "")
        .replace("&gt;", "")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Parse an item count out of a subtitle such as
/// `"Playlist • You • 1,204 songs"`.
pub fn parse_item_count(text: &str) -> Option<usize> {
    static COUNT_RE: OnceLock<Regex> = OnceLock::new();
    let count_re = COUNT_RE.get_or_init(|| {
        Regex::new(r"(?i)(\d[\d,.]*)\s+(songs?|tracks?|videos?|episodes?)\b")
            .expect("valid count regex")
    });

    let captures = count_re.captures(text)?;
    let digits: String = captures[1].chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Utility functions for logging reconciliation outcomes
pub mod logging {
    use log::{info, warn};

    use crate::error::CatalogError;

    pub fn log_track_added(query: &str, playlist: &str) {
        info!("Added '{}' to '{}'", query, playlist);
    }

    pub fn log_track_add_failed(query: &str, playlist: &str, error: &CatalogError) {
        warn!(
            "Could not add {} to {} on YouTube Music (error: {}). Skipping...",
            query, playlist, error
        );
    }

    pub fn log_not_found(query: &str) {
        info!("Could not find {} on YouTube Music", query);
    }

    pub fn log_search_failed(query: &str, error: &CatalogError) {
        warn!("Search for '{}' failed: {}", query, error);
    }

    pub fn log_playlist_create_failed(name: &str, error: &CatalogError) {
        warn!(
            "Could not create {} on YouTube Music (error: {}). Skipping...",
            name, error
        );
    }
}
