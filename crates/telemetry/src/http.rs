// Path: crates/telemetry/src/http.rs
use axum::{
    body::Bytes,
    error_handling::HandleErrorLayer,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    routing::get,
    Router,
};
use prometheus::{Encoder, Registry, TextEncoder};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

/// Shared state of the metrics endpoint.
#[derive(Debug, Clone)]
pub struct MetricsEndpoint {
    registry: Registry,
    ready: Arc<AtomicBool>,
}

impl MetricsEndpoint {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flips `/readyz` between 200 and 503.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

async fn metrics_handler(
    State(endpoint): State<MetricsEndpoint>,
) -> ([(HeaderName, String); 1], Bytes) {
    let encoder = TextEncoder::new();
    let metric_families = endpoint.registry.gather();
    let mut buf = Vec::with_capacity(1 << 16);
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::error!(target: "telemetry", error = %e, "Failed to encode prometheus metrics");
    }
    (
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        buf.into(),
    )
}

async fn healthz_handler() -> &'static str {
    "OK"
}

async fn readyz_handler(State(endpoint): State<MetricsEndpoint>) -> (StatusCode, &'static str) {
    if endpoint.ready.load(Ordering::SeqCst) {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn handle_service_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}

/// Builds the `/metrics`, `/healthz` and `/readyz` router.
pub fn router(endpoint: MetricsEndpoint) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(endpoint)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_service_error))
                .layer(TraceLayer::new_for_http())
                .load_shed()
                .concurrency_limit(8)
                .timeout(Duration::from_secs(2)),
        )
}

/// Serves the metrics endpoint on an already bound listener until `shutdown` flips to `true`.
///
/// Binding is left to the caller so a port conflict fails startup instead of
/// leaving the process running without an endpoint.
pub async fn run_server(
    listener: TcpListener,
    endpoint: MetricsEndpoint,
    mut shutdown: watch::Receiver<bool>,
) {
    match listener.local_addr() {
        Ok(local) => tracing::info!(target: "telemetry", addr = %local, "Serving metrics"),
        Err(e) => tracing::warn!(target: "telemetry", error = %e, "Serving metrics on unknown address"),
    }

    let graceful = axum::serve(listener, router(endpoint).into_make_service())
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            tracing::info!(target: "telemetry", "shutting down gracefully");
        });

    if let Err(e) = graceful.await {
        tracing::error!(target: "telemetry", error = %e, "server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_path(endpoint: &MetricsEndpoint, path: &str) -> (StatusCode, String) {
        let response = router(endpoint.clone())
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_route_renders_registry() {
        let registry = Registry::new();
        let gauge = prometheus::Gauge::new("plant_level", "From the feed").unwrap();
        registry.register(Box::new(gauge.clone())).unwrap();
        gauge.set(3.0);

        let endpoint = MetricsEndpoint::new(registry);
        let (status, body) = get_path(&endpoint, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("plant_level 3"));
    }

    #[tokio::test]
    async fn test_readiness_follows_flag() {
        let endpoint = MetricsEndpoint::new(Registry::new());
        assert_eq!(get_path(&endpoint, "/readyz").await.0, StatusCode::SERVICE_UNAVAILABLE);
        endpoint.set_ready(true);
        assert_eq!(get_path(&endpoint, "/readyz").await.0, StatusCode::OK);
        assert_eq!(get_path(&endpoint, "/healthz").await.1, "OK");
    }

    #[tokio::test]
    async fn test_server_answers_until_shutdown() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = tokio::spawn(run_server(
            listener,
            MetricsEndpoint::new(Registry::new()),
            shutdown_rx,
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
    }
}
