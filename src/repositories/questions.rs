use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Answer, Question};
use crate::db::types::QuestionType;

const QUESTION_COLUMNS: &str =
    "id, quiz_id, question_text, question_type, position, points, created_at";
const ANSWER_COLUMNS: &str = "id, question_id, answer_text, is_correct, position";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) question_text: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) position: Option<i32>,
    pub(crate) points: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct NewAnswer {
    pub(crate) answer_text: String,
    pub(crate) is_correct: bool,
}

/// Writes the question and its answers atomically.
pub(crate) async fn create_with_answers(
    pool: &PgPool,
    params: CreateQuestion<'_>,
    answers: Vec<NewAnswer>,
) -> Result<(Question, Vec<Answer>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let question = sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, quiz_id, question_text, question_type, position, points, created_at
         ) VALUES (
            $1, $2, $3, $4,
            COALESCE($5, (SELECT COALESCE(MAX(position), 0) + 1
                          FROM questions WHERE quiz_id = $2)),
            $6, $7
         )
         RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.question_text)
    .bind(params.question_type)
    .bind(params.position)
    .bind(params.points)
    .bind(params.created_at)
    .fetch_one(&mut *tx)
    .await?;

    let mut stored = Vec::with_capacity(answers.len());
    for (index, answer) in answers.into_iter().enumerate() {
        let position = i32::try_from(index).unwrap_or(i32::MAX);
        let row = sqlx::query_as::<_, Answer>(&format!(
            "INSERT INTO answers (id, question_id, answer_text, is_correct, position)
             VALUES ($1,$2,$3,$4,$5)
             RETURNING {ANSWER_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&question.id)
        .bind(answer.answer_text)
        .bind(answer.is_correct)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;
        stored.push(row);
    }

    tx.commit().await?;
    Ok((question, stored))
}

pub(crate) async fn list_by_quiz(pool: &PgPool, quiz_id: &str) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS}
         FROM questions
         WHERE quiz_id = $1
         ORDER BY position, created_at, id"
    ))
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

/// Every answer belonging to any question of the quiz.
pub(crate) async fn list_answers_by_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(
        "SELECT a.id, a.question_id, a.answer_text, a.is_correct, a.position
         FROM answers a
         JOIN questions q ON q.id = a.question_id
         WHERE q.quiz_id = $1
         ORDER BY q.position, a.position",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}
