pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::email::EmailService;
use crate::services::question_extraction::QuestionExtractor;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let email = EmailService::from_settings(&settings)?;
    if email.is_none() {
        tracing::warn!("Email delivery not configured; accounts will be created pre-verified");
    }

    let extractor = QuestionExtractor::from_settings(&settings)?;
    if extractor.is_none() {
        tracing::warn!("Question extraction not configured; /questions/extract is disabled");
    }

    let state = AppState::new(settings, db_pool, email, extractor);
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "ChemTest API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}
