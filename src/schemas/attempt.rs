use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::TestAttempt;
use crate::db::types::AnswerOption;
use crate::repositories::attempts::SubmittedAttemptRow;
use crate::schemas::test::TestResponse;

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) student_id: String,
    pub(crate) start_time: String,
    pub(crate) end_time: Option<String>,
    pub(crate) is_submitted: bool,
    pub(crate) score: Option<i32>,
    pub(crate) total_marks: i32,
    pub(crate) time_taken_minutes: Option<i32>,
}

impl AttemptResponse {
    pub(crate) fn from_db(attempt: TestAttempt) -> Self {
        Self {
            id: attempt.id,
            test_id: attempt.test_id,
            student_id: attempt.student_id,
            start_time: format_primitive(attempt.start_time),
            end_time: attempt.end_time.map(format_primitive),
            is_submitted: attempt.is_submitted,
            score: attempt.score,
            total_marks: attempt.total_marks,
            time_taken_minutes: attempt.time_taken_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StartTestResponse {
    pub(crate) attempt: AttemptResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerSubmit {
    #[serde(alias = "attemptId")]
    pub(crate) attempt_id: String,
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[serde(alias = "selectedAnswer")]
    pub(crate) selected_answer: AnswerOption,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerSavedResponse {
    pub(crate) message: String,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitTestRequest {
    #[serde(alias = "attemptId")]
    pub(crate) attempt_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitTestResponse {
    pub(crate) message: String,
    pub(crate) score: i32,
    pub(crate) total_marks: i32,
    pub(crate) time_taken: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResultResponse {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) student_id: String,
    pub(crate) start_time: String,
    pub(crate) end_time: Option<String>,
    pub(crate) score: Option<i32>,
    pub(crate) total_marks: i32,
    pub(crate) time_taken_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) student_email: Option<String>,
}

impl AttemptResultResponse {
    pub(crate) fn from_row(row: SubmittedAttemptRow) -> Self {
        Self {
            id: row.id,
            test_id: row.test_id,
            student_id: row.student_id,
            start_time: format_primitive(row.start_time),
            end_time: row.end_time.map(format_primitive),
            score: row.score,
            total_marks: row.total_marks,
            time_taken_minutes: row.time_taken_minutes,
            student_name: row.student_name,
            student_email: row.student_email,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TestResultsResponse {
    pub(crate) results: Vec<AttemptResultResponse>,
    pub(crate) test: TestResponse,
}
