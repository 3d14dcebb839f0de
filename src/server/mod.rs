//! Metrics 暴露端点
//!
//! Serves the process's Prometheus registry at `GET /metrics`. The server
//! shares the process-wide shutdown channel and drains in-flight requests
//! before returning.

mod trace;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use sd_common::DiscoveryMetrics;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use trace::{HttpMakeSpan, HttpTraceLayer, http_trace_layer};

/// Build the router exposing `metrics`
pub fn router(metrics: DiscoveryMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(http_trace_layer())
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<DiscoveryMetrics>) -> Response {
    match metrics.export() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Bind the metrics listener
///
/// Kept separate from [`spawn`] so a port already in use surfaces before the
/// scheduler starts.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Serve `/metrics` on `listener` until `shutdown_tx` fires
///
/// A server error is logged and broadcast as a shutdown so the rest of the
/// process winds down with it.
pub fn spawn(
    listener: TcpListener,
    metrics: DiscoveryMetrics,
    shutdown_tx: broadcast::Sender<()>,
) -> JoinHandle<()> {
    let app = router(metrics);

    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();
        if let Ok(addr) = listener.local_addr() {
            info!("Metrics server listening on {}", addr);
        }

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Metrics server received shutdown signal");
        });

        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
            let _ = shutdown_tx.send(());
        }
        info!("Metrics server stopped");
    })
}
