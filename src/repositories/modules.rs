use sqlx::PgPool;

use crate::db::models::CourseModule;

const COLUMNS: &str = "id, course_id, title, description, position, created_at";

pub(crate) struct CreateModule<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    /// Appended after the last module when absent.
    pub(crate) position: Option<i32>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateModule<'_>,
) -> Result<CourseModule, sqlx::Error> {
    sqlx::query_as::<_, CourseModule>(&format!(
        "INSERT INTO course_modules (id, course_id, title, description, position, created_at)
         VALUES (
            $1, $2, $3, $4,
            COALESCE($5, (SELECT COALESCE(MAX(position), 0) + 1
                          FROM course_modules WHERE course_id = $2)),
            $6
         )
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.position)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    module_id: &str,
) -> Result<Option<CourseModule>, sqlx::Error> {
    sqlx::query_as::<_, CourseModule>(&format!(
        "SELECT {COLUMNS} FROM course_modules WHERE id = $1"
    ))
    .bind(module_id)
    .fetch_optional(pool)
    .await
}

/// Modules in display order; equal positions fall back to insertion order.
pub(crate) async fn list_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<CourseModule>, sqlx::Error> {
    sqlx::query_as::<_, CourseModule>(&format!(
        "SELECT {COLUMNS}
         FROM course_modules
         WHERE course_id = $1
         ORDER BY position, created_at, id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
