//! Read-only template store and hostname matcher.
//!
//! All patterns are compiled once in [`TemplateStore::new`]. After that the
//! store is never mutated, so it is shared behind an `Arc` and read from any
//! number of request tasks without locking.

use super::source::TemplateSource;
use super::template::{DomainTemplate, TemplateConfig};
use crate::error::{ProxyError, Result};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

/// Immutable snapshot of the template configuration with compiled patterns.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: Vec<DomainTemplate>,
    default_headers: HeaderMap,
    /// pattern source -> compiled regex; failed patterns are absent
    compiled: HashMap<String, Regex>,
}

impl TemplateStore {
    /// Build a store, compiling every distinct pattern exactly once.
    ///
    /// Patterns that fail to compile are logged and left out; the template
    /// still matches through its remaining patterns.
    pub fn new(config: TemplateConfig) -> Self {
        let mut compiled = HashMap::new();

        for template in &config.domain_templates {
            for pattern in &template.patterns {
                if compiled.contains_key(pattern) {
                    continue;
                }
                match compile_pattern(pattern) {
                    Ok(re) => {
                        compiled.insert(pattern.clone(), re);
                    }
                    Err(e) => warn!("Skipping pattern: {}", e),
                }
            }
        }

        let default_headers = header_map(&config.default_headers);

        info!(
            "Template store ready: {} templates, {} compiled patterns, {} default headers",
            config.domain_templates.len(),
            compiled.len(),
            default_headers.len()
        );

        Self {
            templates: config.domain_templates,
            default_headers,
            compiled,
        }
    }

    /// Load a config from `source` and build a store from it.
    ///
    /// # Errors
    /// Propagates [`ProxyError::ConfigLoad`] from the source.
    pub fn from_source(source: &dyn TemplateSource) -> Result<Self> {
        Ok(Self::new(source.load()?))
    }

    /// First template (in config order) with a pattern matching the URL's host.
    ///
    /// Returns `None` for unparseable URLs, URLs without a host, or when no
    /// pattern matches.
    pub fn find_match(&self, target_url: &str) -> Option<&DomainTemplate> {
        let parsed = match Url::parse(target_url) {
            Ok(u) => u,
            Err(e) => {
                debug!("No template lookup for unparseable URL {}: {}", target_url, e);
                return None;
            }
        };
        parsed.host_str()?;

        // Patterns see the host as written, not the lowercased/punycode form
        self.match_host(raw_host(target_url)?)
    }

    /// First template with a pattern matching `hostname`.
    pub fn match_host(&self, hostname: &str) -> Option<&DomainTemplate> {
        self.templates.iter().find(|template| {
            template
                .patterns
                .iter()
                .filter_map(|p| self.compiled.get(p))
                .any(|re| re.is_match(hostname))
        })
    }

    /// Headers applied to every outbound request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn templates(&self) -> &[DomainTemplate] {
        &self.templates
    }

    /// Number of patterns that compiled successfully.
    pub fn compiled_patterns(&self) -> usize {
        self.compiled.len()
    }
}

/// Host text of an absolute URL exactly as written: userinfo, port and
/// IPv6 brackets removed.
fn raw_host(url: &str) -> Option<&str> {
    let (_, rest) = url.trim().split_once("://")?;
    let authority = rest
        .split(['/', '?', '#', '\\'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    let host = match host_port.strip_prefix('[') {
        Some(v6) => v6.split_once(']').map_or(v6, |(ip, _)| ip),
        None => host_port.split_once(':').map_or(host_port, |(h, _)| h),
    };

    (!host.is_empty()).then_some(host)
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ProxyError::PatternCompile {
        pattern: pattern.to_string(),
        source,
    })
}

fn header_map(entries: &std::collections::BTreeMap<String, String>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(entries.len());
    for (name, value) in entries {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Skipping invalid default header: {}", name),
        }
    }
    headers
}
