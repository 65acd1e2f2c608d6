pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod progress;
pub mod prompt;
pub mod reconciler;
pub mod session;
pub mod spotify_client;
pub mod utils;
pub mod ytmusic_client;
pub mod ytmusic_headers;
pub mod ytmusic_parser;

#[cfg(test)]
mod testing;
