use crate::error::{ConfigError, ConfigResult};
use crate::models::{SpotifyCredentials, TransferConfig};
use std::env;
use std::path::PathBuf;

/// Configuration manager trait for loading the transfer configuration
pub trait ConfigManager {
    /// Load and validate configuration from environment variables
    fn load_config() -> ConfigResult<TransferConfig>;
}

/// Default configuration manager, reading the process environment
pub struct DefaultConfigManager;

impl ConfigManager for DefaultConfigManager {
    fn load_config() -> ConfigResult<TransferConfig> {
        config_from_lookup(|name| env::var(name).ok())
    }
}

/// Build a configuration from a variable lookup, falling back to defaults
/// for anything unset
fn config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<TransferConfig> {
    let defaults = TransferConfig::default();

    let path_or = |name: &str, default: PathBuf| lookup(name).map(PathBuf::from).unwrap_or(default);

    let spotify_credentials = match (
        lookup("SPOTIFY_CLIENT_ID"),
        lookup("SPOTIFY_CLIENT_SECRET"),
    ) {
        (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
            client_id,
            client_secret,
        }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvironmentVariable {
                var_name: "SPOTIFY_CLIENT_SECRET".to_string(),
            })
        }
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnvironmentVariable {
                var_name: "SPOTIFY_CLIENT_ID".to_string(),
            })
        }
    };

    let spotify_page_size = match lookup("SPOTIFY_PAGE_SIZE") {
        Some(value) => value.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
            field: "SPOTIFY_PAGE_SIZE".to_string(),
            value,
        })?,
        None => defaults.spotify_page_size,
    };

    let config = TransferConfig {
        spotify_auth_file: path_or("SPOTIFY_AUTH_FILE", defaults.spotify_auth_file.clone()),
        spotify_credentials,
        spotify_redirect_uri: lookup("SPOTIFY_REDIRECT_URI")
            .unwrap_or_else(|| defaults.spotify_redirect_uri.clone()),
        spotify_token_cache: path_or("SPOTIFY_TOKEN_CACHE", defaults.spotify_token_cache.clone()),
        spotify_page_size,
        ytmusic_headers_file: path_or("YTMUSIC_HEADERS_FILE", defaults.ytmusic_headers_file.clone()),
        ytmusic_language: lookup("YTMUSIC_LANGUAGE")
            .unwrap_or_else(|| defaults.ytmusic_language.clone()),
    };

    config.validate().map_err(ConfigError::ValidationFailed)?;

    Ok(config)
}

/// Utility functions for configuration management
pub mod utils {
    use super::*;

    /// Load configuration with detailed error reporting
    pub fn load_config_with_details() -> ConfigResult<TransferConfig> {
        // Load .env file if it exists
        let _ = dotenv::dotenv();

        match DefaultConfigManager::load_config() {
            Ok(config) => {
                log::info!("Configuration loaded successfully");
                log::debug!("Spotify auth file: {}", config.spotify_auth_file.display());
                log::debug!("Spotify token cache: {}", config.spotify_token_cache.display());
                log::debug!("Spotify page size: {}", config.spotify_page_size);
                log::debug!("YouTube Music headers file: {}", config.ytmusic_headers_file.display());
                Ok(config)
            }
            Err(e) => {
                log::error!("Failed to load configuration: {:?}", e);
                match &e {
                    ConfigError::MissingEnvironmentVariable { var_name } => {
                        log::error!("Please set the {} environment variable", var_name);
                    }
                    ConfigError::InvalidValue { field, value } => {
                        log::error!("Invalid value '{}' for field '{}'", value, field);
                    }
                    ConfigError::ValidationFailed(msg) => {
                        log::error!("Configuration validation failed: {}", msg);
                    }
                }
                Err(e)
            }
        }
    }

    /// Print configuration template for environment variables
    pub fn print_config_template() {
        println!("# Spotify to YouTube Music Transfer Configuration Template");
        println!("# Every variable is optional; the defaults are shown");
        println!();
        println!("export SPOTIFY_AUTH_FILE=\"spotify_auth.json\"");
        println!("export SPOTIFY_REDIRECT_URI=\"http://localhost/\"");
        println!("export SPOTIFY_TOKEN_CACHE=\".spotify_token_cache.json\"");
        println!("export SPOTIFY_PAGE_SIZE=\"50\"  # 1 to 50");
        println!("export YTMUSIC_HEADERS_FILE=\"ytmusic_headers_auth.json\"");
        println!("export YTMUSIC_LANGUAGE=\"en\"");
        println!();
        println!("# Set both to skip the Spotify credential prompts:");
        println!("export SPOTIFY_CLIENT_ID=\"your_spotify_client_id_here\"");
        println!("export SPOTIFY_CLIENT_SECRET=\"your_spotify_client_secret_here\"");
    }
}
