use sqlx::PgPool;

use crate::db::models::User;
use crate::db::types::UserRole;

const COLUMNS: &str = "\
    id, email, username, full_name, hashed_password, role, is_active, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) email: &'a str,
    pub(crate) username: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Inserts the user and the empty profile matching its role in one transaction.
pub(crate) async fn create_with_profile(
    pool: &PgPool,
    params: CreateUser<'_>,
) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, email, username, full_name, hashed_password, role, is_active,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,TRUE,$7,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.username)
    .bind(params.full_name)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.created_at)
    .fetch_one(&mut *tx)
    .await?;

    let profile_sql = match user.role {
        UserRole::Student => "INSERT INTO student_profiles (user_id) VALUES ($1)",
        UserRole::Educator => "INSERT INTO educator_profiles (user_id) VALUES ($1)",
    };
    sqlx::query(profile_sql).bind(&user.id).execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(user)
}

pub(crate) async fn update_full_name(
    pool: &PgPool,
    id: &str,
    full_name: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET full_name = $1, updated_at = $2 WHERE id = $3")
        .bind(full_name)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
