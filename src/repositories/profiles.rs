use sqlx::PgPool;

use crate::db::models::{EducatorProfile, StudentProfile};

pub(crate) async fn find_student(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(
        "SELECT user_id, bio, date_of_birth FROM student_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_educator(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<EducatorProfile>, sqlx::Error> {
    sqlx::query_as::<_, EducatorProfile>(
        "SELECT user_id, bio, expertise, website FROM educator_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct UpdateStudentProfile {
    pub(crate) bio: Option<String>,
    pub(crate) date_of_birth: Option<time::Date>,
}

/// Upserts so accounts created before profiles existed still get one.
pub(crate) async fn upsert_student(
    pool: &PgPool,
    user_id: &str,
    params: UpdateStudentProfile,
) -> Result<StudentProfile, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(
        "INSERT INTO student_profiles (user_id, bio, date_of_birth)
         VALUES ($1, COALESCE($2, ''), $3)
         ON CONFLICT (user_id) DO UPDATE SET
            bio = COALESCE($2, student_profiles.bio),
            date_of_birth = COALESCE($3, student_profiles.date_of_birth)
         RETURNING user_id, bio, date_of_birth",
    )
    .bind(user_id)
    .bind(params.bio)
    .bind(params.date_of_birth)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateEducatorProfile {
    pub(crate) bio: Option<String>,
    pub(crate) expertise: Option<String>,
    pub(crate) website: Option<String>,
}

pub(crate) async fn upsert_educator(
    pool: &PgPool,
    user_id: &str,
    params: UpdateEducatorProfile,
) -> Result<EducatorProfile, sqlx::Error> {
    sqlx::query_as::<_, EducatorProfile>(
        "INSERT INTO educator_profiles (user_id, bio, expertise, website)
         VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''))
         ON CONFLICT (user_id) DO UPDATE SET
            bio = COALESCE($2, educator_profiles.bio),
            expertise = COALESCE($3, educator_profiles.expertise),
            website = COALESCE($4, educator_profiles.website)
         RETURNING user_id, bio, expertise, website",
    )
    .bind(user_id)
    .bind(params.bio)
    .bind(params.expertise)
    .bind(params.website)
    .fetch_one(pool)
    .await
}
