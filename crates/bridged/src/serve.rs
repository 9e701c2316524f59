//! `bridged serve`: run the exposition server with self-instrumentation.

use std::sync::Arc;
use std::time::Instant;

use bridge_collector::BridgeExporter;
use bridge_core::{BridgeConfig, MetricHandle, MetricValue, ScopedName, TaggedName};
use bridge_exposition::{ExpositionServer, ExpositionState, ScrapeStats, ServerStart};
use tracing::info;

const SELF_GROUP: &str = "bridged";
const SELF_TYPE: &str = "exposition";

/// Register the daemon's own instruments with the exporter.
fn register_self_metrics(exporter: &BridgeExporter, stats: &ScrapeStats) {
    exporter.on_scoped_metric_added(
        ScopedName::new(SELF_GROUP, SELF_TYPE, "ScrapeRequests"),
        MetricHandle::Meter(stats.requests.clone()),
    );
    exporter.on_scoped_metric_added(
        ScopedName::new(SELF_GROUP, SELF_TYPE, "ScrapeLatencyMs"),
        MetricHandle::Timer(stats.latency.clone()),
    );

    let started = Instant::now();
    exporter.on_metric_added(
        TaggedName::new("process", "uptime-seconds")
            .with_description("Seconds since the bridge daemon started."),
        MetricHandle::simple(move || MetricValue::from(started.elapsed().as_secs_f64())),
    );
    exporter.on_metric_added(
        TaggedName::new("process", "version")
            .with_description("Bridge daemon version.")
            .with_tag("version", env!("CARGO_PKG_VERSION")),
        MetricHandle::simple(|| MetricValue::from(1u32)),
    );
}

pub async fn run(config: BridgeConfig, namespace: String) -> anyhow::Result<()> {
    let port = config.port;
    let exporter = Arc::new(BridgeExporter::new(config)?);
    exporter.on_namespace_change(&namespace);

    let stats = ScrapeStats::default();
    register_self_metrics(&exporter, &stats);

    let server = ExpositionServer::new(
        ExpositionState::new(exporter.clone()).with_scrape_stats(stats),
    );
    match server.start(port).await {
        ServerStart::Started(port) => info!(port, "serving metrics on /metrics"),
        ServerStart::AlreadyRunning => {
            anyhow::bail!("port {port} is already serving metrics");
        }
        ServerStart::Failed(cause) => {
            anyhow::bail!("failed to start exposition server on port {port}: {cause}");
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    server.shutdown().await;
    exporter.close();
    info!("bridged stopped");
    Ok(())
}
