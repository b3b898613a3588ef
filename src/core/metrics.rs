use std::sync::OnceLock;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder when enabled. Calling it again after a
/// successful install is a no-op; the global recorder can only be set once
/// per process.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROMETHEUS.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install the Prometheus recorder")?;

    metrics::describe_counter!("http_requests_total", "HTTP requests served, by status code");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds, by status code"
    );

    let _ = PROMETHEUS.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROMETHEUS.get().map(PrometheusHandle::render)
}
