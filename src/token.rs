//! Proxy-routable tokens.
//!
//! A token is `<prefix>/<base64url(absolute URL)>`, optionally followed by
//! `?headers=<percent-encoded blob>`. The blob is opaque to the codec: it is
//! escaped exactly once on the way out and never inspected.

use crate::error::{ProxyError, Result};
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use url::form_urlencoded;

/// Query parameter carrying the original-headers blob.
pub const HEADERS_PARAM: &str = "headers";

/// Default route prefix tokens live under.
pub const DEFAULT_PREFIX: &str = "/anime";

/// URL-safe alphabet; emits padding, accepts input with or without it.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes absolute URLs into proxy paths and back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenCodec {
    prefix: String,
}

impl TokenCodec {
    /// Create a codec for the given route prefix.
    ///
    /// The prefix is normalized to a leading slash and no trailing slash,
    /// so `anime/`, `/anime` and `/anime/` are equivalent.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
        }
    }

    /// Normalized route prefix, e.g. `/anime`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the proxy path for `url`, attaching `headers_blob` when non-empty.
    pub fn encode(&self, url: &str, headers_blob: &str) -> String {
        let encoded = TOKEN_ENGINE.encode(url.as_bytes());
        let mut token = format!("{}/{}", self.prefix, encoded);

        if !headers_blob.is_empty() {
            token.push('?');
            token.push_str(HEADERS_PARAM);
            token.push('=');
            token.extend(form_urlencoded::byte_serialize(headers_blob.as_bytes()));
        }

        token
    }

    /// Recover the absolute URL from a proxy path.
    ///
    /// Any query string is ignored; the blob travels separately.
    ///
    /// # Errors
    /// [`ProxyError::InvalidToken`] when the prefix is missing, the segment
    /// is empty, or the segment is not base64url-encoded UTF-8.
    pub fn decode(&self, path: &str) -> Result<String> {
        let path = path.split_once('?').map_or(path, |(p, _)| p);

        let segment = path
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| {
                ProxyError::InvalidToken(format!("path does not start with {}/", self.prefix))
            })?;

        if segment.is_empty() {
            return Err(ProxyError::InvalidToken("missing token".to_string()));
        }

        let bytes = TOKEN_ENGINE
            .decode(segment)
            .map_err(|e| ProxyError::InvalidToken(format!("not base64url: {}", e)))?;

        String::from_utf8(bytes)
            .map_err(|_| ProxyError::InvalidToken("decoded token is not UTF-8".to_string()))
    }
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
