use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_test_owner, CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Question, Test};
use crate::db::types::{ExamType, UserRole};
use crate::repositories;
use crate::schemas::test::{
    QuestionCreate, QuestionResponse, StudentQuestionResponse, StudentTestResponse,
    TestCreate, TestDetailResponse, TestListResponse, TestQuestions, TestResponse,
};
use crate::schemas::MessageResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct ListTestsQuery {
    #[serde(default, alias = "examType")]
    exam_type: Option<ExamType>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_test).get(list_tests))
        .route("/:test_id", get(get_test).delete(delete_test))
        .route("/:test_id/questions", post(add_question))
        .route("/:test_id/publish", patch(publish_test))
}

async fn create_test(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<TestCreate>,
) -> Result<(StatusCode, Json<TestResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let test = repositories::tests::create(
        state.db(),
        repositories::tests::CreateTest {
            id: &Uuid::new_v4().to_string(),
            title: payload.title.trim(),
            description: &payload.description,
            duration_minutes: payload.duration_minutes,
            exam_type: payload.exam_type,
            created_by: &teacher.id,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create test"))?;

    Ok((StatusCode::CREATED, Json(TestResponse::from_db(test))))
}

async fn list_tests(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListTestsQuery>,
) -> Result<Json<TestListResponse>, ApiError> {
    let response = match user.role {
        UserRole::Teacher => {
            let tests =
                repositories::tests::list_for_teacher(state.db(), &user.id, params.exam_type)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to list tests"))?;
            TestListResponse::Teacher {
                tests: tests.into_iter().map(TestResponse::from_db).collect(),
            }
        }
        UserRole::Student => {
            let tests = repositories::tests::list_published(state.db(), params.exam_type)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list tests"))?;
            TestListResponse::Student {
                tests: tests.into_iter().map(StudentTestResponse::from_db).collect(),
            }
        }
    };

    Ok(Json(response))
}

async fn get_test(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<TestDetailResponse>, ApiError> {
    let test = fetch_test_for_viewer(&state, &user.id, user.role, &test_id).await?;

    let questions = repositories::questions::list_for_test(state.db(), &test.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    let questions = match user.role {
        UserRole::Teacher => {
            TestQuestions::Teacher(questions.into_iter().map(QuestionResponse::from_db).collect())
        }
        UserRole::Student => TestQuestions::Student(
            questions.into_iter().map(StudentQuestionResponse::from_db).collect(),
        ),
    };

    Ok(Json(TestDetailResponse { test: TestResponse::from_db(test), questions }))
}

async fn add_question(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let test = require_test_owner(&state, &teacher, &test_id).await?;

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let question_order: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE test_id = $1")
            .bind(&test.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;

    let question = sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, test_id, question_text, option_a, option_b, option_c, option_d,
            correct_answer, marks, question_order, image_url, option_a_image,
            option_b_image, option_c_image, option_d_image, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
        RETURNING {}",
        repositories::questions::COLUMNS,
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(&test.id)
    .bind(payload.question_text)
    .bind(payload.option_a)
    .bind(payload.option_b)
    .bind(payload.option_c)
    .bind(payload.option_d)
    .bind(payload.correct_answer)
    .bind(payload.marks)
    .bind((question_order + 1) as i32)
    .bind(payload.image_url)
    .bind(payload.option_a_image)
    .bind(payload.option_b_image)
    .bind(payload.option_c_image)
    .bind(payload.option_d_image)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    // The test's total stays in step with its questions inside one commit.
    sqlx::query("UPDATE tests SET total_marks = total_marks + $1, updated_at = $2 WHERE id = $3")
        .bind(question.marks)
        .bind(now)
        .bind(&test.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update test total marks"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

async fn publish_test(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<TestResponse>, ApiError> {
    let test = require_test_owner(&state, &teacher, &test_id).await?;

    let updated =
        repositories::tests::set_published(state.db(), &test.id, !test.is_published, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update publish state"))?;

    Ok(Json(TestResponse::from_db(updated)))
}

async fn delete_test(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let test = require_test_owner(&state, &teacher, &test_id).await?;

    repositories::tests::delete_by_id(state.db(), &test.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete test"))?;

    Ok(Json(MessageResponse { message: "Test deleted successfully".to_string() }))
}

async fn fetch_test_for_viewer(
    state: &AppState,
    user_id: &str,
    role: UserRole,
    test_id: &str,
) -> Result<Test, ApiError> {
    let test = repositories::tests::find_by_id(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    match role {
        UserRole::Teacher => {
            if test.created_by != user_id {
                return Err(ApiError::Forbidden("You do not own this test"));
            }
        }
        UserRole::Student => {
            if !test.is_active || !test.is_published {
                return Err(ApiError::NotFound("Test not found".to_string()));
            }
        }
    }

    Ok(test)
}
