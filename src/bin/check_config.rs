use std::path::Path;

use log::{error, info, warn};
use ytm_transfer::auth::load_credentials;
use ytm_transfer::config::utils::{load_config_with_details, print_config_template};
use ytm_transfer::ytmusic_headers::BrowserHeaders;

fn check_file(label: &str, path: &Path) -> bool {
    if path.exists() {
        info!("✅ {} found at {}", label, path.display());
        true
    } else {
        warn!("⚠️  {} not found at {} - you will be prompted", label, path.display());
        false
    }
}

fn main() {
    // Load .env file if it exists
    let _ = dotenv::dotenv();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Spotify to YouTube Music Configuration Check");
    info!("============================================");

    if Path::new(".env").exists() {
        info!("✅ .env file found");
    } else {
        warn!("⚠️  .env file not found - using system environment variables and defaults");
    }

    let config = match load_config_with_details() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuration validation failed: {}", e);
            error!("");
            print_config_template();
            std::process::exit(1);
        }
    };

    info!("✅ Configuration loaded successfully!");
    info!("");
    info!("Configuration Summary:");
    info!("=====================");
    info!("  Spotify redirect URI: {}", config.spotify_redirect_uri);
    info!("  Spotify page size: {}", config.spotify_page_size);
    info!("  YouTube Music language: {}", config.ytmusic_language);
    info!("");

    let mut warnings = 0;
    let mut errors = 0;

    match &config.spotify_credentials {
        Some(credentials) => {
            info!("✅ Spotify credentials taken from the environment");
            if credentials.client_id.len() != 32 {
                warn!("⚠️  Spotify client ID is not 32 characters - this might be incorrect");
                warnings += 1;
            }
        }
        None => {
            if check_file("Spotify credentials file", &config.spotify_auth_file) {
                if let Err(e) = load_credentials(&config.spotify_auth_file) {
                    error!("❌ {}", e);
                    errors += 1;
                }
            } else {
                warnings += 1;
            }
        }
    }

    if !check_file("Spotify token cache", &config.spotify_token_cache) {
        warnings += 1;
    }

    if check_file("YouTube Music headers file", &config.ytmusic_headers_file) {
        match BrowserHeaders::load(&config.ytmusic_headers_file) {
            Ok(_) => info!("✅ YouTube Music headers carry a SAPISID cookie"),
            Err(e) => {
                error!("❌ {}", e);
                errors += 1;
            }
        }
    } else {
        warnings += 1;
    }

    info!("");
    info!("Validation Summary:");
    info!("==================");
    if errors == 0 && warnings == 0 {
        info!("🎉 All configuration checks passed!");
    } else {
        if errors > 0 {
            error!("❌ {} error(s) found - please fix these before running the transfer", errors);
        }
        if warnings > 0 {
            warn!("⚠️  {} warning(s) found - the transfer will prompt for the missing pieces", warnings);
        }
    }

    if errors > 0 {
        std::process::exit(1);
    }
}
