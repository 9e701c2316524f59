//! HTTP exposition server.
//!
//! Serves `GET /metrics` from a [`BridgeExporter`]. Starting is modelled
//! as a [`ServerStart`] result so the caller decides what a second start or
//! an occupied port means.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bridge_collector::BridgeExporter;
use bridge_collector::instruments::{Meter, Timer};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::prometheus::{TEXT_FORMAT, render_exporter};

/// Instruments updated on every scrape.
#[derive(Clone, Default)]
pub struct ScrapeStats {
    pub requests: Arc<Meter>,
    pub latency: Arc<Timer>,
}

/// Shared state for exposition handlers.
#[derive(Clone)]
pub struct ExpositionState {
    pub exporter: Arc<BridgeExporter>,
    pub scrapes: Option<ScrapeStats>,
}

impl ExpositionState {
    pub fn new(exporter: Arc<BridgeExporter>) -> Self {
        Self {
            exporter,
            scrapes: None,
        }
    }

    pub fn with_scrape_stats(mut self, stats: ScrapeStats) -> Self {
        self.scrapes = Some(stats);
        self
    }
}

/// Build the exposition router (`/metrics`, `/healthz`).
pub fn build_router(state: ExpositionState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// GET /metrics
pub async fn metrics(State(state): State<ExpositionState>) -> Response {
    let start = Instant::now();
    let rendered = render_exporter(&state.exporter);
    if let Some(stats) = &state.scrapes {
        stats.requests.mark(1);
        stats.latency.update(start.elapsed());
    }

    match rendered {
        Ok(body) => (StatusCode::OK, [(CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "scrape failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /healthz
pub async fn healthz(State(state): State<ExpositionState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "namespace": state.exporter.namespace().get(),
        "tagged_metrics": state.exporter.tagged().registry().len(),
        "scoped_metrics": state.exporter.scoped().registry().len(),
    }))
}

/// Outcome of [`ExpositionServer::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStart {
    /// Listening on the given port.
    Started(u16),
    /// This server is already running, or the port is taken.
    AlreadyRunning,
    Failed(String),
}

struct RunningServer {
    port: u16,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Start/stop wrapper around the exposition router.
pub struct ExpositionServer {
    state: ExpositionState,
    bind: IpAddr,
    running: Mutex<Option<RunningServer>>,
}

impl ExpositionServer {
    /// Create a server listening on all interfaces once started.
    pub fn new(state: ExpositionState) -> Self {
        Self {
            state,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            running: Mutex::new(None),
        }
    }

    pub fn with_bind_addr(mut self, bind: IpAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Bind `port` (0 picks a free port) and serve in a background task.
    pub async fn start(&self, port: u16) -> ServerStart {
        let mut running = self.running.lock().await;
        if let Some(server) = running.as_ref() {
            info!(port = server.port, "exposition server already running");
            return ServerStart::AlreadyRunning;
        }

        let addr = SocketAddr::new(self.bind, port);
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                warn!(%addr, "exposition port already in use");
                return ServerStart::AlreadyRunning;
            }
            Err(e) => {
                error!(%addr, error = %e, "failed to start exposition server");
                return ServerStart::Failed(e.to_string());
            }
        };
        let port = match listener.local_addr() {
            Ok(local) => local.port(),
            Err(e) => return ServerStart::Failed(e.to_string()),
        };

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let router = build_router(self.state.clone());
        let handle = tokio::spawn(async move {
            let signal = async move {
                // A dropped sender also stops the server.
                let _ = shutdown_rx.changed().await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
            {
                error!(error = %e, "exposition server error");
            }
        });

        info!(port, "exposition server started");
        *running = Some(RunningServer {
            port,
            shutdown,
            handle,
        });
        ServerStart::Started(port)
    }

    /// Port of the running server, if any.
    pub async fn port(&self) -> Option<u16> {
        self.running.lock().await.as_ref().map(|s| s.port)
    }

    /// Stop the server and wait for in-flight scrapes to finish.
    pub async fn shutdown(&self) {
        let Some(server) = self.running.lock().await.take() else {
            return;
        };
        let _ = server.shutdown.send(true);
        if let Err(e) = server.handle.await {
            warn!(error = %e, "exposition server task failed");
        }
        info!(port = server.port, "exposition server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use bridge_core::{BridgeConfig, MetricHandle, MetricValue, ScopedName, TaggedName};
    use tower::ServiceExt;

    fn test_exporter() -> Arc<BridgeExporter> {
        Arc::new(BridgeExporter::new(BridgeConfig::default()).unwrap())
    }

    async fn body_string(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_families() {
        let exporter = test_exporter();
        exporter.on_namespace_change("kafka.server");
        exporter.on_metric_added(
            TaggedName::new("group", "name").with_tag("key", "value"),
            MetricHandle::simple(|| MetricValue::Number(1.0)),
        );

        let resp = build_router(ExpositionState::new(exporter))
            .oneshot(get_request("/metrics"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.contains("text/plain"));

        let body = body_string(resp).await;
        assert!(body.contains("kafka_server_group_name{key=\"value\"} 1.0"));
    }

    #[tokio::test]
    async fn metrics_endpoint_skips_tagged_model_without_namespace() {
        let exporter = test_exporter();
        exporter.on_metric_added(
            TaggedName::new("group", "name"),
            MetricHandle::simple(|| MetricValue::Number(1.0)),
        );
        exporter.on_scoped_metric_added(
            ScopedName::new("kafka.server", "ReplicaManager", "LeaderCount"),
            MetricHandle::gauge(|| MetricValue::Number(12.0)),
        );

        let resp = build_router(ExpositionState::new(exporter))
            .oneshot(get_request("/metrics"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_string(resp).await;
        assert!(body.contains("kafka_server_replicamanager_leadercount 12.0"));
        assert!(!body.contains("group_name"));
    }

    #[tokio::test]
    async fn metrics_endpoint_merges_colliding_names() {
        let exporter = test_exporter();
        exporter.on_namespace_change("kafka.server");
        exporter.on_scoped_metric_added(
            ScopedName::new("kafka_server", "group", "name").with_scope("k.scoped"),
            MetricHandle::gauge(|| MetricValue::Number(1.0)),
        );
        exporter.on_scoped_metric_added(
            ScopedName::new("z", "z", "z"),
            MetricHandle::gauge(|| MetricValue::Number(2.0)),
        );
        exporter.on_metric_added(
            TaggedName::new("group", "name").with_tag("k", "tagged"),
            MetricHandle::simple(|| MetricValue::Number(3.0)),
        );

        let resp = build_router(ExpositionState::new(exporter))
            .oneshot(get_request("/metrics"))
            .await
            .unwrap();
        let body = body_string(resp).await;
        assert_eq!(body.matches("# TYPE kafka_server_group_name gauge").count(), 1);
        assert!(body.contains("kafka_server_group_name{k=\"scoped\"} 1.0"));
        assert!(body.contains("kafka_server_group_name{k=\"tagged\"} 3.0"));
    }

    #[tokio::test]
    async fn scrape_stats_updated() {
        let stats = ScrapeStats::default();
        let state = ExpositionState::new(test_exporter()).with_scrape_stats(stats.clone());
        let router = build_router(state);

        for _ in 0..2 {
            let resp = router.clone().oneshot(get_request("/metrics")).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
        use bridge_core::Counting;
        assert_eq!(stats.requests.count(), 2);
        assert_eq!(stats.latency.count(), 2);
    }

    #[tokio::test]
    async fn healthz_reports_counts() {
        let exporter = test_exporter();
        exporter.on_namespace_change("ns");
        let resp = build_router(ExpositionState::new(exporter))
            .oneshot(get_request("/healthz"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["namespace"], "ns");
        assert_eq!(body["tagged_metrics"], 0);
    }

    #[tokio::test]
    async fn start_twice_reports_already_running() {
        let server = ExpositionServer::new(ExpositionState::new(test_exporter()))
            .with_bind_addr(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let ServerStart::Started(port) = server.start(0).await else {
            panic!("server did not start");
        };
        assert_ne!(port, 0);
        assert_eq!(server.port().await, Some(port));
        assert_eq!(server.start(0).await, ServerStart::AlreadyRunning);

        server.shutdown().await;
        assert_eq!(server.port().await, None);
        // Shutting down twice is harmless.
        server.shutdown().await;
    }

    #[tokio::test]
    async fn occupied_port_reports_already_running() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let server = ExpositionServer::new(ExpositionState::new(test_exporter()))
            .with_bind_addr(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(server.start(port).await, ServerStart::AlreadyRunning);
        assert_eq!(server.port().await, None);
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let exporter = test_exporter();
        exporter.on_scoped_metric_added(
            bridge_core::ScopedName::new("g", "t", "n"),
            MetricHandle::gauge(|| MetricValue::Number(2.0)),
        );
        let server = ExpositionServer::new(ExpositionState::new(exporter))
            .with_bind_addr(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let ServerStart::Started(port) = server.start(0).await else {
            panic!("server did not start");
        };

        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        stream
            .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("g_t_n 2.0"));

        server.shutdown().await;
    }
}
