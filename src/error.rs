use thiserror::Error;

/// Remote failures reported by either the source or the destination catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Rate limit exceeded, retry after: {retry_after_ms}ms")]
    RateLimitExceeded { retry_after_ms: u64 },
    #[error("API request failed: {status} - {message}")]
    ApiRequestFailed { status: u16, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("JSON parsing error: {0}")]
    JsonParsingError(String),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl CatalogError {
    /// Whether the remote side is throttling us.
    ///
    /// YouTube Music does not always answer with a 429; playlist creation
    /// bursts come back as a 4xx whose message mentions the quota instead.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CatalogError::RateLimitExceeded { .. } => true,
            CatalogError::ApiRequestFailed { status, message } => {
                let message = message.to_lowercase();
                *status == 429
                    || message.contains("rate limit")
                    || message.contains("too many")
                    || message.contains("quota")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return CatalogError::JsonParsingError(err.to_string());
        }
        match err.status() {
            Some(status) if status.as_u16() == 429 => {
                CatalogError::RateLimitExceeded { retry_after_ms: 0 }
            }
            Some(status) => CatalogError::ApiRequestFailed {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => CatalogError::NetworkError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::JsonParsingError(err.to_string())
    }
}

/// Configuration-related errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {var_name}")]
    MissingEnvironmentVariable { var_name: String },
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Startup authentication errors. None of these are recoverable.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },
    #[error("Failed to save {path}: {message}")]
    SaveFailed { path: String, message: String },
    #[error("Malformed credentials in {path}: {message}")]
    MalformedCredentials { path: String, message: String },
    #[error("Missing required header: {header}")]
    MissingHeader { header: String },
    #[error("Cookie does not contain a SAPISID value")]
    MissingSapisid,
    #[error("Authorization code not found in redirect URL: {url}")]
    MissingAuthorizationCode { url: String },
    #[error("OAuth exchange failed: {0}")]
    OAuthFailed(String),
    #[error("Prompt failed: {0}")]
    PromptFailed(String),
    #[error("Verification failed: {0}")]
    VerificationFailed(#[from] CatalogError),
}

/// Interactive session errors
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Failed to read input: {0}")]
    InputFailed(String),
    #[error("Failed to write output: {0}")]
    OutputFailed(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::OutputFailed(err.to_string())
    }
}

/// Result type aliases for specific error types
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type AuthResult<T> = Result<T, AuthError>;
pub type SessionResult<T> = Result<T, SessionError>;
