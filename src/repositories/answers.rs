use sqlx::PgPool;
use time::PrimitiveDateTime;

/// Upsert keyed by (attempt_id, question_id): a resubmission replaces the
/// prior selection and re-evaluates correctness.
pub(crate) async fn upsert(
    pool: &PgPool,
    id: &str,
    attempt_id: &str,
    question_id: &str,
    selected_answer: crate::db::types::AnswerOption,
    is_correct: bool,
    answered_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO student_answers
            (id, attempt_id, question_id, selected_answer, is_correct, answered_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (attempt_id, question_id)
         DO UPDATE SET selected_answer = $4, is_correct = $5, answered_at = $6",
    )
    .bind(id)
    .bind(attempt_id)
    .bind(question_id)
    .bind(selected_answer)
    .bind(is_correct)
    .bind(answered_at)
    .execute(pool)
    .await?;
    Ok(())
}
