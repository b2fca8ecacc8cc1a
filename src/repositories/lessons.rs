use sqlx::PgPool;

use crate::db::models::Lesson;
use crate::db::types::LessonContentType;

const COLUMNS: &str = "\
    id, module_id, title, content_type, position, text_content, video_url, pdf_file, \
    duration_minutes, created_at";

pub(crate) struct CreateLesson<'a> {
    pub(crate) id: &'a str,
    pub(crate) module_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) content_type: LessonContentType,
    pub(crate) position: Option<i32>,
    pub(crate) text_content: &'a str,
    pub(crate) video_url: &'a str,
    pub(crate) pdf_file: Option<&'a str>,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateLesson<'_>) -> Result<Lesson, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "INSERT INTO lessons (
            id, module_id, title, content_type, position, text_content, video_url, pdf_file,
            duration_minutes, created_at
         ) VALUES (
            $1, $2, $3, $4,
            COALESCE($5, (SELECT COALESCE(MAX(position), 0) + 1
                          FROM lessons WHERE module_id = $2)),
            $6, $7, $8, $9, $10
         )
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.module_id)
    .bind(params.title)
    .bind(params.content_type)
    .bind(params.position)
    .bind(params.text_content)
    .bind(params.video_url)
    .bind(params.pdf_file)
    .bind(params.duration_minutes)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, lesson_id: &str) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!("SELECT {COLUMNS} FROM lessons WHERE id = $1"))
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
}

/// Every lesson of a course, ordered by module then lesson position.
pub(crate) async fn list_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(
        "SELECT l.id, l.module_id, l.title, l.content_type, l.position, l.text_content,
                l.video_url, l.pdf_file, l.duration_minutes, l.created_at
         FROM lessons l
         JOIN course_modules m ON m.id = l.module_id
         WHERE m.course_id = $1
         ORDER BY m.position, m.created_at, m.id, l.position, l.created_at, l.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_course(pool: &PgPool, course_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM lessons l
         JOIN course_modules m ON m.id = l.module_id
         WHERE m.course_id = $1",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
}
