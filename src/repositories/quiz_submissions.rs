use sqlx::PgPool;

use crate::db::models::QuizSubmission;

const COLUMNS: &str = "id, student_id, quiz_id, score, passed, submitted_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SubmissionWithStudent {
    #[sqlx(flatten)]
    pub(crate) submission: QuizSubmission,
    pub(crate) student_name: String,
}

pub(crate) struct CreateSubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) score: f64,
    pub(crate) passed: bool,
    pub(crate) submitted_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<QuizSubmission, sqlx::Error> {
    sqlx::query_as::<_, QuizSubmission>(&format!(
        "INSERT INTO quiz_submissions (id, student_id, quiz_id, score, passed, submitted_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.quiz_id)
    .bind(params.score)
    .bind(params.passed)
    .bind(params.submitted_at)
    .fetch_one(pool)
    .await
}

/// Latest attempt; identical timestamps fall back to insertion order.
pub(crate) async fn find_last(
    pool: &PgPool,
    student_id: &str,
    quiz_id: &str,
) -> Result<Option<QuizSubmission>, sqlx::Error> {
    sqlx::query_as::<_, QuizSubmission>(&format!(
        "SELECT {COLUMNS}
         FROM quiz_submissions
         WHERE student_id = $1 AND quiz_id = $2
         ORDER BY submitted_at DESC, seq DESC
         LIMIT 1"
    ))
    .bind(student_id)
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
    quiz_id: &str,
) -> Result<Vec<SubmissionWithStudent>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionWithStudent>(
        "SELECT s.id, s.student_id, s.quiz_id, s.score, s.passed, s.submitted_at,
                u.full_name AS student_name
         FROM quiz_submissions s
         JOIN users u ON u.id = s.student_id
         WHERE s.student_id = $1 AND s.quiz_id = $2
         ORDER BY s.submitted_at DESC, s.seq DESC",
    )
    .bind(student_id)
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<SubmissionWithStudent>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionWithStudent>(
        "SELECT s.id, s.student_id, s.quiz_id, s.score, s.passed, s.submitted_at,
                u.full_name AS student_name
         FROM quiz_submissions s
         JOIN users u ON u.id = s.student_id
         WHERE s.quiz_id = $1
         ORDER BY s.submitted_at DESC, s.seq DESC",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}
