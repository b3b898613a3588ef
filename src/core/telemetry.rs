use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Sets up the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the configured log level is used as the filter.
pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(telemetry.log_level.clone()));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let result = if telemetry.json { subscriber.json().try_init() } else { subscriber.try_init() };

    result.map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}
