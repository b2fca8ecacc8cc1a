use sqlx::PgPool;

use crate::db::models::{Course, Enrollment};

const COLUMNS: &str = "id, student_id, course_id, enrolled_at, completed, progress";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct EnrolledCourseRow {
    #[sqlx(flatten)]
    pub(crate) course: Course,
    pub(crate) enrolled_at: time::PrimitiveDateTime,
    pub(crate) completed: bool,
    pub(crate) progress: i32,
}

/// Get-or-create over the unique (student, course) pair.
/// Returns the enrollment and whether this call inserted it.
pub(crate) async fn get_or_create(
    pool: &PgPool,
    id: &str,
    student_id: &str,
    course_id: &str,
    enrolled_at: time::PrimitiveDateTime,
) -> Result<(Enrollment, bool), sqlx::Error> {
    let inserted = sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, student_id, course_id, enrolled_at, completed, progress)
         VALUES ($1, $2, $3, $4, FALSE, 0)
         ON CONFLICT (student_id, course_id) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(student_id)
    .bind(course_id)
    .bind(enrolled_at)
    .fetch_optional(pool)
    .await?;

    if let Some(enrollment) = inserted {
        return Ok((enrollment, true));
    }

    let existing = sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 AND course_id = $2"
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;

    Ok((existing, false))
}

pub(crate) async fn find(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 AND course_id = $2"
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn count_by_course(pool: &PgPool, course_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<EnrolledCourseRow>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledCourseRow>(
        "SELECT c.id, c.title, c.description, c.educator_id, c.is_published, c.category,
                c.level, c.thumbnail, c.created_at, c.updated_at,
                e.enrolled_at, e.completed, e.progress
         FROM enrollments e
         JOIN courses c ON c.id = e.course_id
         WHERE e.student_id = $1
         ORDER BY e.enrolled_at DESC, e.id DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn set_progress(
    pool: &PgPool,
    enrollment_id: &str,
    progress: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE enrollments SET progress = $1, completed = ($1 >= 100) WHERE id = $2")
        .bind(progress)
        .bind(enrollment_id)
        .execute(pool)
        .await?;
    Ok(())
}
