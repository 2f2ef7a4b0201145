use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vidrelay::{
    config::Config,
    domains::{FileTemplateSource, TemplateStore},
    server,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting vidrelay {}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let source = FileTemplateSource::with_default_candidates(config.templates_path.clone());
    let templates = match TemplateStore::from_source(&source) {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::start(config, templates).await {
        error!("Failed to start server: {}", e);
        std::process::exit(1);
    }
}
