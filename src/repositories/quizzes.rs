use sqlx::PgPool;

use crate::db::models::Quiz;

const COLUMNS: &str = "id, lesson_id, title, description, passing_score, created_at";

pub(crate) struct CreateQuiz<'a> {
    pub(crate) id: &'a str,
    pub(crate) lesson_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) passing_score: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Get-or-create over the one-quiz-per-lesson constraint.
/// Returns the quiz and whether this call inserted it.
pub(crate) async fn get_or_create(
    pool: &PgPool,
    params: CreateQuiz<'_>,
) -> Result<(Quiz, bool), sqlx::Error> {
    let inserted = sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (id, lesson_id, title, description, passing_score, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT (lesson_id) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.lesson_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.passing_score)
    .bind(params.created_at)
    .fetch_optional(pool)
    .await?;

    if let Some(quiz) = inserted {
        return Ok((quiz, true));
    }

    let existing = sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes WHERE lesson_id = $1"
    ))
    .bind(params.lesson_id)
    .fetch_one(pool)
    .await?;

    Ok((existing, false))
}

pub(crate) async fn find_by_id(pool: &PgPool, quiz_id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_id_by_lesson(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM quizzes WHERE lesson_id = $1")
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
}
