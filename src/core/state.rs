use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::email::EmailService;
use crate::services::question_extraction::QuestionExtractor;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    email: Option<EmailService>,
    extractor: Option<QuestionExtractor>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        email: Option<EmailService>,
        extractor: Option<QuestionExtractor>,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, email, extractor }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    pub(crate) fn extractor(&self) -> Option<&QuestionExtractor> {
        self.inner.extractor.as_ref()
    }
}
