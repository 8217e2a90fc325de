use thiserror::Error;

/// Error type for every Deluge client operation.
#[derive(Error, Debug)]
pub enum DelugeError {
    /// Login was rejected or no valid session could be established
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The daemon answered with a non-null `error` field (or a bare string body)
    #[error("rpc error: {message}")]
    Rpc { message: String, code: Option<i64> },

    /// A torrent or host could not be found
    #[error("not found: {0}")]
    NotFound(String),

    /// The upload endpoint reported failure
    #[error("upload failed: {0}")]
    Upload(String),

    /// The daemon refused to add a torrent
    #[error("add torrent failed: {0}")]
    AddTorrent(String),

    /// Torrent input could not be turned into something the daemon accepts
    #[error("invalid torrent: {0}")]
    InvalidTorrent(String),

    /// The daemon handed out a session cookie we could not parse
    #[error("invalid session cookie: {0}")]
    InvalidCookie(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Network level failures, timeouts and non-2xx statuses from the HTTP layer
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DelugeError {
    /// Builds an [`DelugeError::Rpc`] from the daemon's `error` value.
    ///
    /// Deluge sends `{"message": ..., "code": ...}`; older gateways and proxies
    /// sometimes answer with a plain string instead.
    pub fn from_rpc_error(error: &serde_json::Value) -> Self {
        match error {
            serde_json::Value::String(message) => DelugeError::Rpc {
                message: message.clone(),
                code: None,
            },
            serde_json::Value::Object(map) => DelugeError::Rpc {
                message: map
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string()),
                code: map.get("code").and_then(|c| c.as_i64()),
            },
            other => DelugeError::Rpc {
                message: other.to_string(),
                code: None,
            },
        }
    }
}

pub type Result<T, E = DelugeError> = std::result::Result<T, E>;
