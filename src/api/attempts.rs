use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{elapsed_minutes, primitive_now_utc};
use crate::db::models::TestAttempt;
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::attempts::StartOutcome;
use crate::schemas::attempt::{
    AnswerSavedResponse, AnswerSubmit, AttemptResponse, AttemptResultResponse,
    StartTestResponse, SubmitTestRequest, SubmitTestResponse, TestResultsResponse,
};
use crate::schemas::test::TestResponse;

/// Ownership failures and already-submitted attempts answer identically, so
/// guessing other students' attempt ids reveals nothing.
const ATTEMPT_NOT_FOUND: &str = "Test attempt not found or already submitted";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/start/:test_id", post(start_test))
        .route("/answer", post(submit_answer))
        .route("/submit", post(submit_test))
        .route("/results/:test_id", get(test_results))
}

async fn start_test(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<(StatusCode, Json<StartTestResponse>), ApiError> {
    let test = repositories::tests::find_active_by_id(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    // Two racing starts converge on the same row: the loser of the insert
    // picks up the winner's attempt. A submitted attempt blocks new ones.
    let outcome = repositories::attempts::insert_or_resume(
        state.db(),
        &Uuid::new_v4().to_string(),
        &test.id,
        &student.id,
        test.total_marks,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to start test attempt"))?;

    let (status, attempt, message) = match outcome {
        StartOutcome::Started(attempt) => (StatusCode::CREATED, attempt, None),
        StartOutcome::Resumed(attempt) => {
            (StatusCode::OK, attempt, Some("Resuming existing test attempt".to_string()))
        }
        StartOutcome::AlreadyCompleted => {
            return Err(ApiError::BadRequest("Test already completed".to_string()));
        }
    };

    Ok((status, Json(StartTestResponse { attempt: AttemptResponse::from_db(attempt), message })))
}

async fn submit_answer(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<AnswerSubmit>,
) -> Result<Json<AnswerSavedResponse>, ApiError> {
    let attempt = fetch_open_attempt(&state, &payload.attempt_id, &student.id).await?;

    let question = repositories::questions::find_by_id(state.db(), &payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question"))?
        .filter(|question| question.test_id == attempt.test_id)
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let is_correct = payload.selected_answer == question.correct_answer;

    repositories::answers::upsert(
        state.db(),
        &Uuid::new_v4().to_string(),
        &attempt.id,
        &question.id,
        payload.selected_answer,
        is_correct,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save answer"))?;

    Ok(Json(AnswerSavedResponse { message: "Answer saved".to_string(), is_correct }))
}

async fn submit_test(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<SubmitTestRequest>,
) -> Result<Json<SubmitTestResponse>, ApiError> {
    let attempt = fetch_open_attempt(&state, &payload.attempt_id, &student.id).await?;

    let now = primitive_now_utc();
    let time_taken = elapsed_minutes(attempt.start_time, now);

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    // Marks are summed over the correctness flags frozen at answer time;
    // editing a question after submission never rescores anyone.
    let score: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(CASE WHEN sa.is_correct THEN q.marks ELSE 0 END), 0)
         FROM student_answers sa
         JOIN questions q ON q.id = sa.question_id
         WHERE sa.attempt_id = $1",
    )
    .bind(&attempt.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| ApiError::internal(e, "Failed to compute score"))?;

    let finalized = sqlx::query_scalar::<_, String>(
        "UPDATE test_attempts
         SET is_submitted = TRUE, end_time = $1, score = $2, time_taken_minutes = $3
         WHERE id = $4 AND NOT is_submitted
         RETURNING id",
    )
    .bind(now)
    .bind(score as i32)
    .bind(time_taken)
    .bind(&attempt.id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| ApiError::internal(e, "Failed to finalize test attempt"))?;

    if finalized.is_none() {
        return Err(ApiError::NotFound(ATTEMPT_NOT_FOUND.to_string()));
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok(Json(SubmitTestResponse {
        message: "Test submitted successfully".to_string(),
        score: score as i32,
        total_marks: attempt.total_marks,
        time_taken,
    }))
}

async fn test_results(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<TestResultsResponse>, ApiError> {
    let test = repositories::tests::find_by_id(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    let results = match user.role {
        UserRole::Teacher => {
            if test.created_by != user.id {
                return Err(ApiError::Forbidden("You do not own this test"));
            }
            repositories::attempts::list_submitted_for_test(state.db(), &test.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load results"))?
        }
        UserRole::Student => {
            repositories::attempts::find_submitted_for_student(state.db(), &test.id, &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load results"))?
                .into_iter()
                .collect()
        }
    };

    Ok(Json(TestResultsResponse {
        results: results.into_iter().map(AttemptResultResponse::from_row).collect(),
        test: TestResponse::from_db(test),
    }))
}

async fn fetch_open_attempt(
    state: &AppState,
    attempt_id: &str,
    student_id: &str,
) -> Result<TestAttempt, ApiError> {
    repositories::attempts::find_open_for_student(state.db(), attempt_id, student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test attempt"))?
        .ok_or_else(|| ApiError::NotFound(ATTEMPT_NOT_FOUND.to_string()))
}
