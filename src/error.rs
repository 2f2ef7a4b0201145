use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Result alias used throughout the proxy
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Every failure the proxy can surface, from startup to a single request
#[derive(Error, Debug)]
pub enum ProxyError {
    /// No template candidate could be read and parsed. Fatal at startup.
    #[error("Failed to load domain templates: {0}")]
    ConfigLoad(String),

    /// A single host pattern failed to compile. Logged, never rendered.
    #[error("Invalid domain pattern '{pattern}': {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Target not allowed: {0}")]
    InvalidTarget(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(#[from] reqwest::Error),

    #[error("Failed to scan playlist: {0}")]
    PlaylistScan(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status reported to the client for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidToken(_) | ProxyError::UrlParse(_) => StatusCode::BAD_REQUEST,
            ProxyError::InvalidTarget(_) => StatusCode::FORBIDDEN,
            ProxyError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
            ProxyError::ConfigLoad(_)
            | ProxyError::PatternCompile { .. }
            | ProxyError::PlaylistScan(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        (status, format!("{}\n", self)).into_response()
    }
}
