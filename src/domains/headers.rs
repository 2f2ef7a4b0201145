//! Outbound request header synthesis.

use super::template::DomainTemplate;
use reqwest::header::{
    CACHE_CONTROL, CONTENT_LENGTH, HOST, HeaderMap, HeaderName, HeaderValue, ORIGIN, PRAGMA,
    RANGE, REFERER,
};
use std::collections::BTreeMap;
use tracing::debug;

pub const SEC_FETCH_SITE: HeaderName = HeaderName::from_static("sec-fetch-site");

/// Build the outbound header set for one upstream fetch.
///
/// Starts from `defaults`, overrides Origin / Referer / Sec-Fetch-Site with
/// whichever of them the template sets, and forwards the client's Range
/// header verbatim.
pub fn synthesize(
    template: Option<&DomainTemplate>,
    defaults: &HeaderMap,
    range: Option<&HeaderValue>,
) -> HeaderMap {
    let mut headers = defaults.clone();

    if let Some(template) = template {
        set_if_present(&mut headers, ORIGIN, template.origin());
        set_if_present(&mut headers, REFERER, template.referer());
        set_if_present(&mut headers, SEC_FETCH_SITE, template.sec_fetch_site());

        if template.use_cache_headers {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }
    }

    if let Some(range) = range {
        headers.insert(RANGE, range.clone());
    }

    headers
}

/// Apply a headers blob of the form `{"Name": "value", ...}` on top of `headers`.
///
/// Host, Range and Content-Length entries are ignored. Blobs that are not a
/// JSON object of strings apply nothing. Returns how many headers were set.
pub fn apply_header_blob(headers: &mut HeaderMap, blob: &str) -> usize {
    if blob.is_empty() {
        return 0;
    }

    let entries: BTreeMap<String, String> = match serde_json::from_str(blob) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Headers blob is not a JSON string map, passing through only: {}", e);
            return 0;
        }
    };

    let mut applied = 0;
    for (name, value) in entries {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            debug!("Ignoring blob header with invalid name: {}", name);
            continue;
        };
        if name == HOST || name == RANGE || name == CONTENT_LENGTH {
            continue;
        }
        let Ok(value) = HeaderValue::from_str(&value) else {
            debug!("Ignoring blob header with invalid value: {}", name);
            continue;
        };
        headers.insert(name, value);
        applied += 1;
    }

    applied
}

fn set_if_present(headers: &mut HeaderMap, name: HeaderName, value: Option<&str>) {
    let Some(value) = value else { return };
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => debug!("Template value for {} is not a valid header value", name),
    }
}
