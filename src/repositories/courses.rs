use sqlx::PgPool;

use crate::db::models::Course;
use crate::db::types::CourseLevel;

const COURSE_COLUMNS: &str = "\
    id, title, description, educator_id, is_published, category, level, thumbnail, \
    created_at, updated_at";

/// Course row joined with its educator's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CourseListRow {
    #[sqlx(flatten)]
    pub(crate) course: Course,
    pub(crate) educator_name: String,
}

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) educator_id: &'a str,
    pub(crate) is_published: bool,
    pub(crate) category: &'a str,
    pub(crate) level: CourseLevel,
    pub(crate) thumbnail: Option<&'a str>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateCourse {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) is_published: Option<bool>,
    pub(crate) category: Option<String>,
    pub(crate) level: Option<CourseLevel>,
    pub(crate) thumbnail: Option<String>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, title, description, educator_id, is_published, category, level, thumbnail,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.educator_id)
    .bind(params.is_published)
    .bind(params.category)
    .bind(params.level)
    .bind(params.thumbnail)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_with_educator(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<CourseListRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseListRow>(
        "SELECT c.id, c.title, c.description, c.educator_id, c.is_published, c.category,
                c.level, c.thumbnail, c.created_at, c.updated_at,
                u.full_name AS educator_name
         FROM courses c
         JOIN users u ON u.id = c.educator_id
         WHERE c.id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_published(pool: &PgPool) -> Result<Vec<CourseListRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseListRow>(
        "SELECT c.id, c.title, c.description, c.educator_id, c.is_published, c.category,
                c.level, c.thumbnail, c.created_at, c.updated_at,
                u.full_name AS educator_name
         FROM courses c
         JOIN users u ON u.id = c.educator_id
         WHERE c.is_published = TRUE
         ORDER BY c.created_at DESC, c.id DESC",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_educator(
    pool: &PgPool,
    educator_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS}
         FROM courses
         WHERE educator_id = $1
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(educator_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    params: UpdateCourse,
) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            is_published = COALESCE($3, is_published),
            category = COALESCE($4, category),
            level = COALESCE($5, level),
            thumbnail = COALESCE($6, thumbnail),
            updated_at = $7
         WHERE id = $8
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.is_published)
    .bind(params.category)
    .bind(params.level)
    .bind(params.thumbnail)
    .bind(params.updated_at)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, course_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1").bind(course_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Distinct students enrolled in any course owned by the educator.
pub(crate) async fn count_students_for_educator(
    pool: &PgPool,
    educator_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT e.student_id)
         FROM enrollments e
         JOIN courses c ON c.id = e.course_id
         WHERE c.educator_id = $1",
    )
    .bind(educator_id)
    .fetch_one(pool)
    .await
}
