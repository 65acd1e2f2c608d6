//! Browser request headers used to authenticate against YouTube Music.
//!
//! Users copy the request headers of an authenticated `music.youtube.com`
//! request out of their browser's developer tools. The parsed headers are
//! stored as a flat JSON object and replayed on every API call.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{AuthError, AuthResult};

pub const YTM_ORIGIN: &str = "https://music.youtube.com";

/// Headers that must not be replayed verbatim
const DROPPED_HEADERS: &[&str] = &["content-length", "accept-encoding", "host", "connection"];

/// Cookie names carrying the SAPISID secret, in order of preference
const SAPISID_COOKIES: &[&str] = &["__Secure-3PAPISID", "SAPISID"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrowserHeaders {
    headers: BTreeMap<String, String>,
}

impl BrowserHeaders {
    /// Parse headers pasted from the browser, one `name: value` per line.
    ///
    /// Names are lower-cased. HTTP/2 pseudo headers (`:authority`, ...)
    /// and lines without a colon are ignored.
    pub fn parse_raw(raw: &str) -> AuthResult<Self> {
        let mut headers = BTreeMap::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim().to_lowercase();
            if DROPPED_HEADERS.contains(&name.as_str()) {
                continue;
            }
            headers.insert(name, value.trim().to_string());
        }

        let parsed = Self { headers };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load previously saved headers
    pub fn load(path: &Path) -> AuthResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AuthError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let parsed: Self =
            serde_json::from_str(&contents).map_err(|e| AuthError::MalformedCredentials {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn save(&self, path: &Path) -> AuthResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| AuthError::SaveFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| AuthError::SaveFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn validate(&self) -> AuthResult<()> {
        if self.cookie().is_none() {
            return Err(AuthError::MissingHeader {
                header: "cookie".to_string(),
            });
        }
        self.sapisid().map(|_| ())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn cookie(&self) -> Option<&str> {
        self.get("cookie")
    }

    /// Every stored header as (name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The SAPISID secret taken from the cookie header
    pub fn sapisid(&self) -> AuthResult<String> {
        let cookie = self.cookie().ok_or_else(|| AuthError::MissingHeader {
            header: "cookie".to_string(),
        })?;

        let pairs: BTreeMap<&str, &str> = cookie
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .collect();

        SAPISID_COOKIES
            .iter()
            .find_map(|name| pairs.get(name).filter(|v| !v.is_empty()))
            .map(|v| v.to_string())
            .ok_or(AuthError::MissingSapisid)
    }

    /// `Authorization` header value for a request issued at `timestamp`
    /// (seconds since the epoch).
    pub fn authorization(&self, timestamp: i64) -> AuthResult<String> {
        let sapisid = self.sapisid()?;
        Ok(sapisid_hash(&sapisid, YTM_ORIGIN, timestamp))
    }
}

/// `SAPISIDHASH {ts}_{sha1("{ts} {sapisid} {origin}")}`
pub fn sapisid_hash(sapisid: &str, origin: &str, timestamp: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{} {} {}", timestamp, sapisid, origin).as_bytes());
    format!("SAPISIDHASH {}_{}", timestamp, hex::encode(hasher.finalize()))
}
