//! Line-by-line playlist rewriting.
//!
//! Every resource reference in a playlist is resolved against the playlist's
//! own URL and replaced with a proxy token, so the player fetches nested
//! playlists, segments, keys and init sections back through the proxy.
//! Line order and count are preserved; a reference that cannot be resolved
//! is left exactly as it was.

use super::attributes::Directive;
use crate::error::Result;
use crate::token::TokenCodec;
use std::borrow::Cow;
use std::io::BufRead;
use tracing::debug;
use url::Url;

/// Marker that starts tag and comment lines.
pub const DIRECTIVE_MARKER: char = '#';

/// Tags whose quoted `URI` attribute points at a fetchable resource.
pub const URI_DIRECTIVES: &[&str] = &[
    "EXT-X-KEY",
    "EXT-X-MAP",
    "EXT-X-SESSION-KEY",
    "EXT-X-MEDIA",
    "EXT-X-I-FRAME-STREAM-INF",
    "EXT-X-PART",
    "EXT-X-PRELOAD-HINT",
    "EXT-X-RENDITION-REPORT",
];

/// Result of rewriting one playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    /// Number of references replaced by tokens
    pub rewritten: usize,
}

/// Rewrites playlists fetched from one base URL.
#[derive(Debug, Clone)]
pub struct PlaylistRewriter<'a> {
    codec: &'a TokenCodec,
    base: Option<Url>,
    headers_blob: &'a str,
}

impl<'a> PlaylistRewriter<'a> {
    /// Create a rewriter resolving against `base_url`.
    ///
    /// An unparseable base is tolerated: absolute references are still
    /// rewritten, relative ones pass through.
    pub fn new(codec: &'a TokenCodec, base_url: &str, headers_blob: &'a str) -> Self {
        let base = match Url::parse(base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("Playlist base {} is not a valid URL: {}", base_url, e);
                None
            }
        };

        Self {
            codec,
            base,
            headers_blob,
        }
    }

    /// Create a rewriter from an already parsed base.
    pub fn with_base(codec: &'a TokenCodec, base: Url, headers_blob: &'a str) -> Self {
        Self {
            codec,
            base: Some(base),
            headers_blob,
        }
    }

    /// Rewrite playlist text.
    pub fn rewrite(&self, playlist: &str) -> Result<RewriteOutcome> {
        self.rewrite_reader(playlist.as_bytes())
    }

    /// Rewrite a playlist read line by line from `reader`.
    ///
    /// `\n` and `\r\n` both end a line; output lines are joined with `\n`
    /// and a final line terminator is not reproduced.
    ///
    /// # Errors
    /// [`crate::error::ProxyError::PlaylistScan`] if reading fails, including
    /// on invalid UTF-8. No partial output is returned.
    pub fn rewrite_reader<R: BufRead>(&self, reader: R) -> Result<RewriteOutcome> {
        let mut lines = Vec::new();
        let mut rewritten = 0;

        for line in reader.lines() {
            let line = line?;
            let out = self.rewrite_line(&line);
            if let Cow::Owned(_) = out {
                rewritten += 1;
            }
            lines.push(out.into_owned());
        }

        Ok(RewriteOutcome {
            text: lines.join("\n"),
            rewritten,
        })
    }

    /// Rewrite a single line. Borrowed output means the line is unchanged.
    pub fn rewrite_line<'l>(&self, line: &'l str) -> Cow<'l, str> {
        if line.trim().is_empty() {
            return Cow::Borrowed(line);
        }

        if line.starts_with(DIRECTIVE_MARKER) {
            return self.rewrite_directive(line);
        }

        match self.resolve(line.trim()) {
            Some(url) => Cow::Owned(self.codec.encode(url.as_str(), self.headers_blob)),
            None => Cow::Borrowed(line),
        }
    }

    fn rewrite_directive<'l>(&self, line: &'l str) -> Cow<'l, str> {
        let Some(directive) = Directive::parse(line) else {
            return Cow::Borrowed(line);
        };

        if !URI_DIRECTIVES.iter().any(|tag| *tag == directive.tag) {
            return Cow::Borrowed(line);
        }

        let Some(uri) = directive
            .attributes
            .iter()
            .find(|a| a.quoted && a.key.eq_ignore_ascii_case("URI"))
        else {
            return Cow::Borrowed(line);
        };

        let Some(resolved) = self.resolve(uri.value) else {
            return Cow::Borrowed(line);
        };

        let token = self.codec.encode(resolved.as_str(), self.headers_blob);
        let span = uri.value_span.clone();

        let mut out = String::with_capacity(line.len() + token.len());
        out.push_str(&line[..span.start]);
        out.push_str(&token);
        out.push_str(&line[span.end..]);
        Cow::Owned(out)
    }

    fn resolve(&self, reference: &str) -> Option<Url> {
        let resolved = match &self.base {
            Some(base) => base.join(reference),
            None => Url::parse(reference),
        };

        match resolved {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("Leaving unresolvable reference {:?}: {}", reference, e);
                None
            }
        }
    }
}

/// Rewrite `playlist` fetched from `base_url`, threading `headers_blob`
/// into every token.
pub fn rewrite(
    codec: &TokenCodec,
    playlist: &str,
    base_url: &str,
    headers_blob: &str,
) -> Result<String> {
    PlaylistRewriter::new(codec, base_url, headers_blob)
        .rewrite(playlist)
        .map(|outcome| outcome.text)
}
