use sqlx::PgPool;

/// Records the completion once; returns true when a row was inserted.
pub(crate) async fn insert_if_absent(
    pool: &PgPool,
    id: &str,
    student_id: &str,
    lesson_id: &str,
    completed_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO lesson_completions (id, student_id, lesson_id, completed_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (student_id, lesson_id) DO NOTHING",
    )
    .bind(id)
    .bind(student_id)
    .bind(lesson_id)
    .bind(completed_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn exists(
    pool: &PgPool,
    student_id: &str,
    lesson_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(
            SELECT 1 FROM lesson_completions WHERE student_id = $1 AND lesson_id = $2
         )",
    )
    .bind(student_id)
    .bind(lesson_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn count_for_course(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM lesson_completions lc
         JOIN lessons l ON l.id = lc.lesson_id
         JOIN course_modules m ON m.id = l.module_id
         WHERE lc.student_id = $1 AND m.course_id = $2",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}
