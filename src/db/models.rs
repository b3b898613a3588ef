use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AnswerOption, ExamType, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) name: String,
    pub(crate) role: UserRole,
    pub(crate) is_email_verified: bool,
    pub(crate) email_verification_token_hash: Option<String>,
    pub(crate) email_verification_expires: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Test {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) duration_minutes: i32,
    /// Running sum of attached questions' marks, adjusted inside the same
    /// transaction as every question insert/delete.
    pub(crate) total_marks: i32,
    pub(crate) is_active: bool,
    pub(crate) is_published: bool,
    pub(crate) exam_type: ExamType,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) correct_answer: AnswerOption,
    pub(crate) marks: i32,
    /// Assigned as count+1 at insert time, never reassigned on delete.
    pub(crate) question_order: i32,
    pub(crate) image_url: Option<String>,
    pub(crate) option_a_image: Option<String>,
    pub(crate) option_b_image: Option<String>,
    pub(crate) option_c_image: Option<String>,
    pub(crate) option_d_image: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestAttempt {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) student_id: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: Option<PrimitiveDateTime>,
    pub(crate) is_submitted: bool,
    pub(crate) score: Option<i32>,
    /// Snapshot of the test's total_marks at start time; deliberately not
    /// re-synced when the teacher edits the test afterwards.
    pub(crate) total_marks: i32,
    pub(crate) time_taken_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudentAnswer {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    pub(crate) selected_answer: AnswerOption,
    pub(crate) is_correct: bool,
    pub(crate) answered_at: PrimitiveDateTime,
}
