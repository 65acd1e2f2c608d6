//! Startup authentication against both services.
//!
//! Every failure here is fatal: the binary reports it and exits before
//! any transfer starts.

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use log::info;
use rspotify::prelude::*;
use rspotify::{scopes, AuthCodeSpotify, Config, Credentials, OAuth};

use crate::error::{AuthError, AuthResult, SessionError};
use crate::models::{SpotifyCredentials, TransferConfig};
use crate::prompt::Prompter;
use crate::spotify_client::SpotifyClient;
use crate::ytmusic_client::YtMusicClient;
use crate::ytmusic_headers::BrowserHeaders;

const HEADERS_INSTRUCTIONS: &str = "Paste your YouTube Music request headers here, then press Enter on an empty line.\n\
(Open music.youtube.com while logged in, open the developer tools network tab, \
select any POST request to \"browse\" and copy its request headers.)";

fn prompt_error(err: SessionError) -> AuthError {
    AuthError::PromptFailed(err.to_string())
}

fn required_answer<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    question: &str,
) -> AuthResult<String> {
    match prompter.ask(question).map_err(prompt_error)? {
        Some(answer) if !answer.is_empty() => Ok(answer),
        _ => Err(AuthError::PromptFailed(format!("No answer given to: {}", question.trim()))),
    }
}

pub fn load_credentials(path: &Path) -> AuthResult<SpotifyCredentials> {
    let contents = fs::read_to_string(path).map_err(|e| AuthError::ReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| AuthError::MalformedCredentials {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn save_credentials(path: &Path, credentials: &SpotifyCredentials) -> AuthResult<()> {
    let save_failed = |message: String| AuthError::SaveFailed {
        path: path.display().to_string(),
        message,
    };
    let json = serde_json::to_string(credentials).map_err(|e| save_failed(e.to_string()))?;
    fs::write(path, json).map_err(|e| save_failed(e.to_string()))
}

/// Spotify app credentials from the environment, the stored file, or the user
pub fn resolve_spotify_credentials<R: BufRead, W: Write>(
    config: &TransferConfig,
    prompter: &mut Prompter<R, W>,
) -> AuthResult<SpotifyCredentials> {
    if let Some(credentials) = &config.spotify_credentials {
        return Ok(credentials.clone());
    }

    let path = config.spotify_auth_file.as_path();
    if path.exists()
        && prompter
            .confirm("Use existing Spotify authentication info?")
            .map_err(prompt_error)?
    {
        return load_credentials(path);
    }

    let client_id = required_answer(
        prompter,
        "Copy the client id from your Spotify app and paste it here: ",
    )?;
    let client_secret = required_answer(
        prompter,
        "Copy the client secret from your Spotify app and paste it here: ",
    )?;
    let credentials = SpotifyCredentials {
        client_id,
        client_secret,
    };
    save_credentials(path, &credentials)?;
    Ok(credentials)
}

/// YouTube Music browser headers from the stored file or the user
pub fn resolve_ytmusic_headers<R: BufRead, W: Write>(
    config: &TransferConfig,
    prompter: &mut Prompter<R, W>,
) -> AuthResult<BrowserHeaders> {
    let path = config.ytmusic_headers_file.as_path();
    if path.exists()
        && prompter
            .confirm("Use existing YouTube Music authentication headers?")
            .map_err(prompt_error)?
    {
        return BrowserHeaders::load(path);
    }

    let raw = prompter
        .read_block(HEADERS_INSTRUCTIONS)
        .map_err(prompt_error)?;
    let headers = BrowserHeaders::parse_raw(&raw)?;
    headers.save(path)?;
    Ok(headers)
}

/// Authorize against Spotify and verify the token by fetching the current user
pub async fn connect_spotify<R: BufRead, W: Write>(
    config: &TransferConfig,
    prompter: &mut Prompter<R, W>,
) -> AuthResult<SpotifyClient> {
    let credentials = resolve_spotify_credentials(config, prompter)?;

    let oauth = OAuth {
        redirect_uri: config.spotify_redirect_uri.clone(),
        scopes: scopes!(
            "playlist-read-private",
            "user-library-read",
            "user-follow-read"
        ),
        ..Default::default()
    };
    let rspotify_config = Config {
        token_cached: true,
        token_refreshing: true,
        cache_path: config.spotify_token_cache.clone(),
        ..Default::default()
    };
    let spotify = AuthCodeSpotify::with_config(
        Credentials::new(&credentials.client_id, &credentials.client_secret),
        oauth,
        rspotify_config,
    );

    match spotify.read_token_cache(true).await {
        Ok(Some(token)) => {
            let mut cached = spotify
                .token
                .lock()
                .await
                .map_err(|_| AuthError::OAuthFailed("Token store is unavailable".to_string()))?;
            *cached = Some(token);
        }
        Ok(None) => authorize(&spotify, prompter).await?,
        Err(e) => {
            log::warn!("Failed to read Spotify token cache: {}", e);
            authorize(&spotify, prompter).await?;
        }
    }

    let client = SpotifyClient::new(spotify, config.spotify_page_size);
    let user_id = client.current_user_id().await?;
    info!("Authenticated with Spotify as {}", user_id);
    Ok(client)
}

/// Authorization-code flow: open the consent page and exchange the code
/// from the pasted redirect URL
async fn authorize<R: BufRead, W: Write>(
    spotify: &AuthCodeSpotify,
    prompter: &mut Prompter<R, W>,
) -> AuthResult<()> {
    let auth_url = spotify
        .get_authorize_url(false)
        .map_err(|e| AuthError::OAuthFailed(e.to_string()))?;

    if open::that(&auth_url).is_err() {
        prompter
            .say(&format!("Open this URL in your browser:\n{}", auth_url))
            .map_err(prompt_error)?;
    } else {
        prompter
            .say("Your browser should open the Spotify authorization page.")
            .map_err(prompt_error)?;
    }

    let redirect_url = required_answer(prompter, "Paste the URL you were redirected to: ")?;
    let code = spotify
        .parse_response_code(&redirect_url)
        .ok_or_else(|| AuthError::MissingAuthorizationCode {
            url: redirect_url.clone(),
        })?;

    spotify
        .request_token(&code)
        .await
        .map_err(|e| AuthError::OAuthFailed(e.to_string()))
}

/// Build the YouTube Music client and verify the headers still authenticate
pub async fn connect_ytmusic<R: BufRead, W: Write>(
    config: &TransferConfig,
    prompter: &mut Prompter<R, W>,
) -> AuthResult<YtMusicClient> {
    let headers = resolve_ytmusic_headers(config, prompter)?;
    let client = YtMusicClient::new(headers, config.ytmusic_language.clone());
    client.verify().await?;
    info!("Authenticated with YouTube Music");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn config_in(dir: &Path) -> TransferConfig {
        TransferConfig {
            spotify_auth_file: dir.join("spotify_auth.json"),
            ytmusic_headers_file: dir.join("ytmusic_headers_auth.json"),
            ..TransferConfig::default()
        }
    }

    fn stored() -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: "stored-id".to_string(),
            client_secret: "stored-secret".to_string(),
        }
    }

    #[test]
    fn test_environment_credentials_skip_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.spotify_credentials = Some(stored());
        let mut p = prompter("");

        assert_eq!(resolve_spotify_credentials(&config, &mut p).unwrap(), stored());
        assert!(p.into_output().is_empty());
    }

    #[test]
    fn test_reuse_stored_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        save_credentials(&config.spotify_auth_file, &stored()).unwrap();
        let mut p = prompter("y\n");

        assert_eq!(resolve_spotify_credentials(&config, &mut p).unwrap(), stored());
        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("Use existing Spotify authentication info? (y/n)"));
    }

    #[test]
    fn test_declined_reuse_prompts_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        save_credentials(&config.spotify_auth_file, &stored()).unwrap();
        let mut p = prompter("n\nnew-id\nnew-secret\n");

        let credentials = resolve_spotify_credentials(&config, &mut p).unwrap();
        assert_eq!(credentials.client_id, "new-id");
        assert_eq!(load_credentials(&config.spotify_auth_file).unwrap(), credentials);
    }

    #[test]
    fn test_missing_answer_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let mut p = prompter("only-id\n");

        assert!(matches!(
            resolve_spotify_credentials(&config, &mut p),
            Err(AuthError::PromptFailed(_))
        ));
    }

    #[test]
    fn test_malformed_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spotify_auth.json");
        fs::write(&path, "{\"client_id\": 1}").unwrap();
        assert!(matches!(
            load_credentials(&path),
            Err(AuthError::MalformedCredentials { .. })
        ));
    }

    #[test]
    fn test_pasted_headers_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let mut p = prompter("cookie: SAPISID=secret\nx-goog-authuser: 1\n\n");

        let headers = resolve_ytmusic_headers(&config, &mut p).unwrap();
        assert_eq!(headers.get("x-goog-authuser"), Some("1"));
        assert_eq!(BrowserHeaders::load(&config.ytmusic_headers_file).unwrap(), headers);

        let mut p = prompter("y\n");
        assert_eq!(resolve_ytmusic_headers(&config, &mut p).unwrap(), headers);
    }

    #[test]
    fn test_pasted_headers_without_cookie_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let mut p = prompter("user-agent: test\n\n");

        assert!(matches!(
            resolve_ytmusic_headers(&config, &mut p),
            Err(AuthError::MissingHeader { .. })
        ));
        assert!(!config.ytmusic_headers_file.exists());
    }
}
