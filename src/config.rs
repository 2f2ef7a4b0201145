use crate::token::DEFAULT_PREFIX;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Process configuration loaded from environment variables
///
/// Domain templates are not part of this; they come from a
/// [`crate::domains::TemplateSource`].
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Path prefix tokens are served under, e.g. `/anime`
    pub route_prefix: String,
    /// Template file probed before the built-in candidate locations
    pub templates_path: Option<PathBuf>,
    /// Per-request upstream timeout; `None` keeps the client default
    pub upstream_timeout: Option<Duration>,
    /// Reject targets whose host is a loopback/private/link-local IP literal
    pub block_private_targets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            route_prefix: DEFAULT_PREFIX.to_string(),
            templates_path: None,
            upstream_timeout: None,
            block_private_targets: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Every variable is optional; unset ones take the [`Default`] value.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Config::default();

        let port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .map_err(|e| format!("PORT must be a port number: {}", e))?,
            Err(_) => defaults.port,
        };

        let route_prefix = env::var("ROUTE_PREFIX").unwrap_or(defaults.route_prefix);

        let templates_path = env::var("TEMPLATES_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let upstream_timeout = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(v) => {
                let secs: u64 = v
                    .parse()
                    .map_err(|e| format!("UPSTREAM_TIMEOUT_SECS must be whole seconds: {}", e))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let block_private_targets = env::var("BLOCK_PRIVATE_TARGETS")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.block_private_targets);

        Ok(Config {
            port,
            route_prefix,
            templates_path,
            upstream_timeout,
            block_private_targets,
        })
    }
}
