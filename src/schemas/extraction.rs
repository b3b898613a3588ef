use serde::{Deserialize, Serialize};

use crate::db::types::AnswerOption;

/// One question as returned by the external extraction collaborator. The
/// correct answer is a best guess and may be absent; it is advisory only and
/// a teacher must confirm or edit it before the question is ever created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExtractedQuestion {
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    #[serde(default)]
    pub(crate) correct_answer: Option<AnswerOption>,
    #[serde(default = "default_marks")]
    pub(crate) marks: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExtractionResponse {
    pub(crate) message: String,
    pub(crate) count: usize,
    pub(crate) questions: Vec<ExtractedQuestion>,
}

fn default_marks() -> i32 {
    1
}
