pub mod handlers;
pub mod state;
pub mod url_validation;

use crate::{config::Config, domains::TemplateStore, error::Result};
use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use state::AppState;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Header carrying the running version on every response
pub const VERSION_HEADER: HeaderName = HeaderName::from_static("x-vidrelay-version");

/// Build the application router
///
/// Exposed separately from [`start`] so tests can drive it with
/// `tower::ServiceExt::oneshot` without binding a socket.
pub fn build_router(config: Config, templates: TemplateStore) -> Result<Router> {
    let state = AppState::new(config, templates)?;
    let prefix = state.codec.prefix().to_string();

    let mut app = Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .route(&format!("{}/{{token}}", prefix), get(handlers::proxy::proxy));

    // Empty token gets a proper 400 instead of a 404; a root prefix leaves "/" to health
    if !prefix.is_empty() {
        app = app.route(&format!("{}/", prefix), get(handlers::proxy::proxy));
    }

    Ok(app
        .with_state(state)
        .layer(cors_layer())
        .layer(middleware::from_fn(version_header)))
}

/// Start the Axum HTTP server
pub async fn start(
    config: Config,
    templates: TemplateStore,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);
    let app = build_router(config, templates)?;

    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

/// Permissive CORS so browser players on any origin can use the proxy
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::RANGE])
        .expose_headers([
            header::CONTENT_LENGTH,
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
        ])
        .max_age(Duration::from_secs(86400))
}

async fn version_header(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        VERSION_HEADER,
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
