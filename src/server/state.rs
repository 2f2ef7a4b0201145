use crate::{
    config::Config,
    domains::TemplateStore,
    error::{ProxyError, Result},
    token::TokenCodec,
};
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Read-only after startup; lookups never lock
    pub templates: Arc<TemplateStore>,
    pub codec: TokenCodec,
    /// Shared HTTP client for connection pooling
    pub http_client: Client,
    pub metrics: PrometheusHandle,
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState from configuration and a loaded template store
    pub fn new(config: Config, templates: TemplateStore) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10);
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            codec: TokenCodec::new(&config.route_prefix),
            config: Arc::new(config),
            templates: Arc::new(templates),
            http_client,
            metrics: crate::metrics::install(),
            started_at: Instant::now(),
        })
    }
}
