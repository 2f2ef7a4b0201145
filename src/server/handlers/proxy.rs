use crate::{
    domains::{apply_header_blob, synthesize},
    error::{ProxyError, Result},
    hls::{PlaylistRewriter, is_playlist_response},
    metrics,
    server::{state::AppState, url_validation::validate_target},
    token::HEADERS_PARAM,
};
use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, Uri,
        header::{
            ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
            LAST_MODIFIED, RANGE,
        },
    },
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::{Url, form_urlencoded};

/// Content type of rewritten playlists
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Upstream response headers copied to the client; everything else is dropped
const PASSTHROUGH_HEADERS: [HeaderName; 7] = [
    CONTENT_LENGTH,
    CONTENT_TYPE,
    CONTENT_RANGE,
    ACCEPT_RANGES,
    CACHE_CONTROL,
    LAST_MODIFIED,
    ETAG,
];

/// Fetch a token's target and return it to the client
///
/// Playlists are rewritten so every reference routes back through the
/// proxy; anything else is streamed through untouched.
pub async fn proxy(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    inbound: HeaderMap,
) -> Response {
    let start = Instant::now();
    let blob = headers_blob(&uri);

    match forward(&state, &uri, &blob, &inbound).await {
        Ok((kind, response)) => {
            metrics::record_request(kind, response.status().as_u16());
            metrics::record_duration(kind, start);
            response
        }
        Err(e) => {
            if matches!(e, ProxyError::UpstreamFetch(_)) {
                metrics::record_upstream_error();
            }
            metrics::record_request("error", e.status().as_u16());
            metrics::record_duration("error", start);
            e.into_response()
        }
    }
}

/// Percent-decoded headers blob; the first occurrence wins when repeated
fn headers_blob(uri: &Uri) -> String {
    uri.query()
        .and_then(|query| {
            form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == HEADERS_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

async fn forward(
    state: &AppState,
    uri: &Uri,
    blob: &str,
    inbound: &HeaderMap,
) -> Result<(&'static str, Response)> {
    let target = state.codec.decode(uri.path())?;
    let target = Url::parse(&target)?;
    validate_target(&target, state.config.block_private_targets)?;

    info!("Proxying {}", target);

    let template = state.templates.find_match(target.as_str());
    if let Some(template) = template {
        debug!("Host {:?} matched template {:?}", target.host_str(), template.patterns);
    }

    let mut outbound = synthesize(
        template,
        state.templates.default_headers(),
        inbound.get(RANGE),
    );
    apply_header_blob(&mut outbound, blob);

    let upstream = state
        .http_client
        .get(target)
        .headers(outbound)
        .send()
        .await?;

    let status = upstream.status();
    let mut headers = HeaderMap::new();
    for name in &PASSTHROUGH_HEADERS {
        for value in upstream.headers().get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    if is_playlist_response(content_type, upstream.url()) {
        // Relative references resolve against the URL after redirects
        let base = upstream.url().clone();
        let body = upstream.bytes().await?;

        let outcome = PlaylistRewriter::with_base(&state.codec, base, blob)
            .rewrite_reader(body.as_ref())?;
        metrics::record_rewritten_references(outcome.rewritten);
        debug!("Rewrote {} playlist references", outcome.rewritten);

        headers.remove(CONTENT_LENGTH);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(PLAYLIST_CONTENT_TYPE));

        return Ok(("playlist", (status, headers, outcome.text).into_response()));
    }

    // Status and headers are already committed once streaming starts
    let body = Body::from_stream(upstream.bytes_stream().inspect_err(|e| {
        metrics::record_upstream_error();
        warn!("Upstream body stream failed: {}", e);
    }));
    Ok(("media", (status, headers, body).into_response()))
}
