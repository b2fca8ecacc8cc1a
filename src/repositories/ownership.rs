//! Resolves any curriculum entity to the course that owns it.

use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct CourseOwnership {
    pub(crate) course_id: String,
    pub(crate) educator_id: String,
    pub(crate) is_published: bool,
}

pub(crate) async fn for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<CourseOwnership>, sqlx::Error> {
    sqlx::query_as::<_, CourseOwnership>(
        "SELECT id AS course_id, educator_id, is_published FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn for_module(
    pool: &PgPool,
    module_id: &str,
) -> Result<Option<CourseOwnership>, sqlx::Error> {
    sqlx::query_as::<_, CourseOwnership>(
        "SELECT c.id AS course_id, c.educator_id, c.is_published
         FROM course_modules m
         JOIN courses c ON c.id = m.course_id
         WHERE m.id = $1",
    )
    .bind(module_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn for_lesson(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Option<CourseOwnership>, sqlx::Error> {
    sqlx::query_as::<_, CourseOwnership>(
        "SELECT c.id AS course_id, c.educator_id, c.is_published
         FROM lessons l
         JOIN course_modules m ON m.id = l.module_id
         JOIN courses c ON c.id = m.course_id
         WHERE l.id = $1",
    )
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn for_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Option<CourseOwnership>, sqlx::Error> {
    sqlx::query_as::<_, CourseOwnership>(
        "SELECT c.id AS course_id, c.educator_id, c.is_published
         FROM quizzes q
         JOIN lessons l ON l.id = q.lesson_id
         JOIN course_modules m ON m.id = l.module_id
         JOIN courses c ON c.id = m.course_id
         WHERE q.id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}
