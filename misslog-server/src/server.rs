use arc_swap::ArcSwap;
use axum::{
    Json, Router,
    extract::{ConnectInfo, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use http::{StatusCode, header};
use misslog_core::config::ServerConfig;
use misslog_core::{Configuration, RequestContext};
use misslog_observability::log_if_not_found;
use misslog_store::SettingsStore;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Shared state for the host.
#[derive(Clone)]
pub struct AppState {
    /// Current logger settings; replaced wholesale on reload.
    pub settings: Arc<ArcSwap<Configuration>>,
    pub server: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(server: ServerConfig, settings: Configuration) -> Self {
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            server: Arc::new(server),
        }
    }
}

/// The routing layer's not-found predicate.
#[inline]
pub fn is_not_found(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND
}

/// Static files from the document root, with every 404 logged.
pub fn build_router(state: AppState) -> Router {
    let files = ServeDir::new(&state.server.document_root);

    Router::new()
        .route("/healthz", get(health_check))
        .fallback_service(files)
        .layer(middleware::from_fn_with_state(state, log_misses))
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Runs after the inner service has produced its final status.
///
/// The settings snapshot is taken once per request; a reload mid-request
/// only affects later requests.
pub async fn log_misses(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let settings = state.settings.load_full();
    if !settings.is_active() {
        return next.run(req).await;
    }

    let ctx = request_context(&req, &state.server);
    let response = next.run(req).await;

    if is_not_found(response.status()) {
        // One small blocking append on the worker thread.
        log_if_not_found(true, &settings, &ctx);
    }
    response
}

/// Snapshot of the request metadata the log line can reference.
pub fn request_context(req: &Request, server: &ServerConfig) -> RequestContext {
    let uri = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();

    let referrer = req
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    RequestContext::new(req.method().as_str(), uri, format!("{:?}", req.version()))
        .with_document_root(server.document_root.as_str())
        .with_remote_addr(remote_addr)
        .with_server_name(server.server_name.as_str())
        .with_host(host)
        .with_referrer(referrer)
}

/// Bind, serve until SIGINT/SIGTERM.
pub async fn serve(server: ServerConfig, store: Arc<dyn SettingsStore>) -> anyhow::Result<()> {
    let settings = store.load()?;
    info!(
        enabled = settings.enabled,
        path = %settings.file_path,
        fallback = !settings.has_template(),
        "Loaded not-found log settings"
    );
    if settings.enabled && settings.file_path.is_empty() {
        warn!("Logging is enabled but no file path is set; nothing will be written");
    }

    let state = AppState::new(server.clone(), settings);

    #[cfg(unix)]
    spawn_reload_on_hangup(Arc::clone(&state.settings), Arc::clone(&store));

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&server.listen_addr).await?;

    info!(
        addr = %server.listen_addr,
        root = %server.document_root,
        "misslog is ready, serving files"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("misslog stopped");
    Ok(())
}

/// Re-read the settings store on SIGHUP.
#[cfg(unix)]
fn spawn_reload_on_hangup(settings: Arc<ArcSwap<Configuration>>, store: Arc<dyn SettingsStore>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGHUP, settings reload disabled");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            match store.load() {
                Ok(cfg) => {
                    settings.store(Arc::new(cfg));
                    info!("Reloaded not-found log settings");
                }
                Err(e) => warn!(error = %e, "Settings reload failed, keeping previous settings"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
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

    info!("Shutdown signal received, stopping...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn server_config() -> ServerConfig {
        ServerConfig {
            document_root: "/var/www".into(),
            server_name: "example.com".into(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn only_404_is_not_found() {
        assert!(is_not_found(StatusCode::NOT_FOUND));
        assert!(!is_not_found(StatusCode::OK));
        assert!(!is_not_found(StatusCode::GONE));
        assert!(!is_not_found(StatusCode::METHOD_NOT_ALLOWED));
    }

    #[test]
    fn request_context_reads_request_metadata() {
        let req = http::Request::builder()
            .method("GET")
            .uri("/missing?q=1")
            .header("host", "www.example.com")
            .header("referer", "http://example.com/")
            .extension(ConnectInfo(SocketAddr::from(([10, 0, 0, 5], 51000))))
            .body(Body::empty())
            .unwrap();

        let ctx = request_context(&req, &server_config());
        assert_eq!(ctx.request_method, "GET");
        assert_eq!(ctx.request_uri, "/missing?q=1");
        assert_eq!(ctx.server_protocol, "HTTP/1.1");
        assert_eq!(ctx.document_root, "/var/www");
        assert_eq!(ctx.remote_addr, "10.0.0.5");
        assert_eq!(ctx.server_name, "example.com");
        assert_eq!(ctx.host, "www.example.com");
        assert_eq!(ctx.referrer(), Some("http://example.com/"));
    }

    #[test]
    fn request_context_tolerates_missing_metadata() {
        let req = http::Request::builder()
            .uri("/nothing")
            .body(Body::empty())
            .unwrap();

        let ctx = request_context(&req, &server_config());
        assert_eq!(ctx.remote_addr, "");
        assert_eq!(ctx.host, "");
        assert!(ctx.referrer().is_none());
    }

    #[test]
    fn request_context_falls_back_to_uri_authority() {
        let req = http::Request::builder()
            .uri("http://cdn.example.com/img.png")
            .body(Body::empty())
            .unwrap();

        let ctx = request_context(&req, &server_config());
        assert_eq!(ctx.host, "cdn.example.com");
        assert_eq!(ctx.request_uri, "/img.png");
    }
}
