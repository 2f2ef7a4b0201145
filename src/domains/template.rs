use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spoofed-header policy for upstream hosts matching any of `patterns`.
///
/// Empty strings are treated the same as absent fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainTemplate {
    /// Regular expressions tested against the upstream hostname, in order
    pub patterns: Vec<String>,
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub sec_fetch_site: Option<String>,
    /// Also send `Cache-Control: no-cache` and `Pragma: no-cache`
    pub use_cache_headers: bool,
}

impl DomainTemplate {
    pub fn origin(&self) -> Option<&str> {
        non_empty(&self.origin)
    }

    pub fn referer(&self) -> Option<&str> {
        non_empty(&self.referer)
    }

    pub fn sec_fetch_site(&self) -> Option<&str> {
        non_empty(&self.sec_fetch_site)
    }
}

/// Template file contents: global headers plus ordered host templates.
///
/// Order of `domain_templates` is significant: the first match wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Headers sent on every outbound request
    pub default_headers: BTreeMap<String, String>,
    pub domain_templates: Vec<DomainTemplate>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
