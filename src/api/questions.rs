use axum::{
    extract::{Multipart, Path, State},
    routing::{delete, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::extraction::ExtractionResponse;
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:question_id", delete(delete_question))
        .route("/extract", post(extract_questions))
}

async fn delete_question(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let question = repositories::questions::find_with_owner(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    if question.created_by != teacher.id {
        return Err(ApiError::Forbidden("You do not own this test"));
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(&question.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    sqlx::query("UPDATE tests SET total_marks = total_marks - $1, updated_at = $2 WHERE id = $3")
        .bind(question.marks)
        .bind(now)
        .bind(&question.test_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update test total marks"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok(Json(MessageResponse { message: "Question deleted successfully".to_string() }))
}

/// Runs the uploaded question paper through the external extractor and hands
/// the draft questions back for review. Nothing is persisted here.
async fn extract_questions(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, ApiError> {
    let Some(extractor) = state.extractor() else {
        return Err(ApiError::ServiceUnavailable(
            "Question extraction is not configured".to_string(),
        ));
    };

    let max_bytes = state.settings().extractor().max_upload_size_mb * 1024 * 1024;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        if bytes.len() as u64 > max_bytes {
            return Err(ApiError::BadRequest(format!(
                "File exceeds the {} MB upload limit",
                state.settings().extractor().max_upload_size_mb
            )));
        }

        upload = Some((file_name, content_type, bytes.to_vec()));
        break;
    }

    let Some((file_name, content_type, bytes)) = upload else {
        return Err(ApiError::BadRequest("Missing 'file' field in upload".to_string()));
    };

    let questions = extractor
        .extract(file_name, content_type, bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Question extraction failed"))?;

    Ok(Json(ExtractionResponse {
        message: "Questions extracted successfully".to_string(),
        count: questions.len(),
        questions,
    }))
}
