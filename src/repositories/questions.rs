use sqlx::PgPool;

use crate::db::models::Question;

pub(crate) const COLUMNS: &str = "\
    id, test_id, question_text, option_a, option_b, option_c, option_d, \
    correct_answer, marks, question_order, image_url, option_a_image, \
    option_b_image, option_c_image, option_d_image, created_at";

pub(crate) async fn list_for_test(
    pool: &PgPool,
    test_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE test_id = $1 ORDER BY question_order, id"
    ))
    .bind(test_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// A question together with the owning teacher of its parent test, for
/// ownership checks that must go through the join.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionOwnership {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) marks: i32,
    pub(crate) created_by: String,
}

pub(crate) async fn find_with_owner(
    pool: &PgPool,
    id: &str,
) -> Result<Option<QuestionOwnership>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOwnership>(
        "SELECT q.id, q.test_id, q.marks, t.created_by
         FROM questions q
         JOIN tests t ON t.id = q.test_id
         WHERE q.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}
