/// Axum webserver lifecycle
///
/// Startup, graceful shutdown via a global notifier, and middleware
/// wiring. The server blocks until `shutdown()` fires.
use crate::logger::{self, LogTag};
use crate::webserver::{routes, state::AppState};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::CorsLayer;

static SHUTDOWN_NOTIFY: once_cell::sync::Lazy<Arc<Notify>> =
    once_cell::sync::Lazy::new(|| Arc::new(Notify::new()));

/// Start the webserver; blocks until shut down
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> Result<(), String> {
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| format!("invalid bind address {}:{}: {}", host, port, e))?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AddrInUse => format!(
                "failed to bind {}: address already in use (is another swapbot running?)",
                addr
            ),
            _ => format!("failed to bind {}: {}", addr, e),
        })?;

    logger::info(
        LogTag::Webserver,
        &format!("listening on http://{} (webhook at /webhook)", addr),
    );

    let shutdown_signal = async {
        SHUTDOWN_NOTIFY.notified().await;
        logger::info(LogTag::Webserver, "shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("server error: {}", e))?;

    logger::info(LogTag::Webserver, "webserver stopped");
    Ok(())
}

/// Trigger webserver shutdown from any thread
pub fn shutdown() {
    SHUTDOWN_NOTIFY.notify_one();
}

fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state).layer(CorsLayer::permissive())
}
