//! HTTP listener exposing `/metrics` and `/healthz`

use super::LookupMetrics;
use crate::error::{AppError, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Build the router serving the metrics exposition and the liveness check
pub fn metrics_router(metrics: LookupMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<LookupMetrics>) -> Response {
    match metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}

/// Metrics listener, bound eagerly so address problems surface at startup
pub struct MetricsServer {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
}

impl MetricsServer {
    /// Bind the listen socket; `addr` is `host:port` and the host may be a name
    pub async fn bind(addr: &str, metrics: LookupMetrics) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::metrics(format!("Failed to bind metric address {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            router: metrics_router(metrics),
            local_addr,
        })
    }

    /// Address actually bound, useful when binding port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `shutdown` is cancelled
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| AppError::metrics(format!("Metric server failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProbeOutcome, ProbeTarget};
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_healthz_is_empty_ok() {
        let router = metrics_router(LookupMetrics::new().unwrap());
        let response = router
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let metrics = LookupMetrics::new().unwrap();
        metrics.observe(&ProbeOutcome::success(&ProbeTarget::new("a.com"), Duration::from_millis(3), Vec::new()));
        let router = metrics_router(metrics);

        let response = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("dnsperf_lookup_success_total 1"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let router = metrics_router(LookupMetrics::new().unwrap());
        let response = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_until_cancelled() {
        let server = MetricsServer::bind("127.0.0.1:0", LookupMetrics::new().unwrap())
            .await
            .unwrap();
        let addr = server.local_addr();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(server.serve(shutdown.clone()));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));

        shutdown.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_metrics_error() {
        let first = MetricsServer::bind("127.0.0.1:0", LookupMetrics::new().unwrap())
            .await
            .unwrap();
        let taken = first.local_addr().to_string();
        let second = MetricsServer::bind(&taken, LookupMetrics::new().unwrap()).await;
        assert!(matches!(second, Err(AppError::Metrics(_))));
    }

    #[tokio::test]
    async fn test_bind_resolves_hostnames() {
        let server = MetricsServer::bind("localhost:0", LookupMetrics::new().unwrap())
            .await
            .unwrap();
        assert!(server.local_addr().ip().is_loopback());
        assert_ne!(server.local_addr().port(), 0);
    }
}
