use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::TestAttempt;

pub(crate) const COLUMNS: &str = "\
    id, test_id, student_id, start_time, end_time, is_submitted, score, \
    total_marks, time_taken_minutes";

#[derive(Debug)]
pub(crate) enum StartOutcome {
    Started(TestAttempt),
    Resumed(TestAttempt),
    AlreadyCompleted,
}

/// Insert a fresh attempt, or yield the existing in-progress one when a
/// concurrent start already created it. The partial unique index on
/// (test_id, student_id) WHERE NOT is_submitted closes the check-then-insert
/// window, and the NOT EXISTS guard keeps the insert from succeeding after
/// the student has already submitted; both checks sit in one statement so
/// there is no gap for a concurrent submit to slip through.
pub(crate) async fn insert_or_resume(
    pool: &PgPool,
    id: &str,
    test_id: &str,
    student_id: &str,
    total_marks: i32,
    start_time: PrimitiveDateTime,
) -> Result<StartOutcome, sqlx::Error> {
    let inserted = sqlx::query_as::<_, TestAttempt>(&format!(
        "INSERT INTO test_attempts (id, test_id, student_id, start_time, total_marks)
         SELECT $1, $2, $3, $4, $5
         WHERE NOT EXISTS (
             SELECT 1 FROM test_attempts
             WHERE test_id = $2 AND student_id = $3 AND is_submitted
         )
         ON CONFLICT (test_id, student_id) WHERE NOT is_submitted DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(test_id)
    .bind(student_id)
    .bind(start_time)
    .bind(total_marks)
    .fetch_optional(pool)
    .await?;

    if let Some(attempt) = inserted {
        return Ok(StartOutcome::Started(attempt));
    }

    let existing = sqlx::query_as::<_, TestAttempt>(&format!(
        "SELECT {COLUMNS} FROM test_attempts
         WHERE test_id = $1 AND student_id = $2 AND NOT is_submitted",
    ))
    .bind(test_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    Ok(match existing {
        Some(attempt) => StartOutcome::Resumed(attempt),
        None => StartOutcome::AlreadyCompleted,
    })
}

/// Ownership and already-submitted failures collapse into `None` so callers
/// can answer with a single generic not-found.
pub(crate) async fn find_open_for_student(
    pool: &PgPool,
    attempt_id: &str,
    student_id: &str,
) -> Result<Option<TestAttempt>, sqlx::Error> {
    sqlx::query_as::<_, TestAttempt>(&format!(
        "SELECT {COLUMNS} FROM test_attempts
         WHERE id = $1 AND student_id = $2 AND NOT is_submitted",
    ))
    .bind(attempt_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SubmittedAttemptRow {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) student_id: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: Option<PrimitiveDateTime>,
    pub(crate) score: Option<i32>,
    pub(crate) total_marks: i32,
    pub(crate) time_taken_minutes: Option<i32>,
    pub(crate) student_name: Option<String>,
    pub(crate) student_email: Option<String>,
}

/// Leaderboard for a test: highest score first, faster completion breaking
/// ties. Unsubmitted attempts never appear.
pub(crate) async fn list_submitted_for_test(
    pool: &PgPool,
    test_id: &str,
) -> Result<Vec<SubmittedAttemptRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmittedAttemptRow>(
        "SELECT ta.id, ta.test_id, ta.student_id, ta.start_time, ta.end_time,
                ta.score, ta.total_marks, ta.time_taken_minutes,
                u.name AS student_name, u.email AS student_email
         FROM test_attempts ta
         JOIN users u ON u.id = ta.student_id
         WHERE ta.test_id = $1 AND ta.is_submitted = TRUE
         ORDER BY ta.score DESC, ta.time_taken_minutes ASC",
    )
    .bind(test_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_submitted_for_student(
    pool: &PgPool,
    test_id: &str,
    student_id: &str,
) -> Result<Option<SubmittedAttemptRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmittedAttemptRow>(
        "SELECT id, test_id, student_id, start_time, end_time, score,
                total_marks, time_taken_minutes,
                NULL::text AS student_name, NULL::text AS student_email
         FROM test_attempts
         WHERE test_id = $1 AND student_id = $2 AND is_submitted = TRUE",
    )
    .bind(test_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}
