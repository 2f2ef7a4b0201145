//! Playlist vs. media classification of upstream responses.

use url::Url;

/// MIME types used for HLS playlists in the wild.
pub const PLAYLIST_CONTENT_TYPES: &[&str] = &[
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/x-mpegurl",
    "audio/mpegurl",
    "video/x-mpegurl",
    "application/mpegurl",
    "application/x-hls",
    "application/x-apple-hls",
];

pub const PLAYLIST_EXTENSION: &str = ".m3u8";

/// Whether a Content-Type value denotes a playlist.
///
/// Case-insensitive containment against [`PLAYLIST_CONTENT_TYPES`], plus a
/// suffix check for the playlist extension.
pub fn is_playlist(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    PLAYLIST_CONTENT_TYPES
        .iter()
        .any(|t| content_type.contains(t))
        || content_type.ends_with(PLAYLIST_EXTENSION)
}

/// Whether an upstream response should go through the playlist rewriter.
///
/// When the content type is missing or generic (`application/octet-stream`,
/// `text/plain`), a target path ending in `.m3u8` decides.
pub fn is_playlist_response(content_type: Option<&str>, target: &Url) -> bool {
    if let Some(ct) = content_type {
        if is_playlist(ct) {
            return true;
        }
        if !is_generic(ct) {
            return false;
        }
    }

    target
        .path()
        .to_ascii_lowercase()
        .ends_with(PLAYLIST_EXTENSION)
}

fn is_generic(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        essence.as_str(),
        "" | "application/octet-stream" | "text/plain"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_any_case() {
        for t in PLAYLIST_CONTENT_TYPES {
            assert!(is_playlist(t), "{}", t);
            assert!(is_playlist(&t.to_uppercase()), "{}", t);
        }
        assert!(is_playlist("Application/VND.Apple.MpegURL; charset=utf-8"));
    }

    #[test]
    fn extension_suffix() {
        assert!(is_playlist("stream.m3u8"));
        assert!(is_playlist("STREAM.M3U8"));
    }

    #[test]
    fn unrelated_types() {
        assert!(!is_playlist("video/mp4"));
        assert!(!is_playlist("video/MP2T"));
        assert!(!is_playlist("application/json"));
        assert!(!is_playlist(""));
    }

    #[test]
    fn generic_type_falls_back_to_path() {
        let m3u8 = Url::parse("https://cdn.example/live/index.m3u8?t=1").unwrap();
        let ts = Url::parse("https://cdn.example/live/seg.ts").unwrap();

        assert!(is_playlist_response(None, &m3u8));
        assert!(is_playlist_response(Some("application/octet-stream"), &m3u8));
        assert!(is_playlist_response(Some("text/plain; charset=utf-8"), &m3u8));
        assert!(!is_playlist_response(None, &ts));
        assert!(!is_playlist_response(Some("application/octet-stream"), &ts));
    }

    #[test]
    fn specific_type_wins_over_path() {
        let m3u8 = Url::parse("https://cdn.example/live/index.m3u8").unwrap();
        let ts = Url::parse("https://cdn.example/live/seg.ts").unwrap();

        assert!(!is_playlist_response(Some("video/mp2t"), &m3u8));
        assert!(is_playlist_response(Some("application/x-mpegURL"), &ts));
    }
}
