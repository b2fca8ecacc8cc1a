use sqlx::Row;

fn database_url() -> Option<String> {
    // Integration tests read POSTGRES_* directly.
    dotenvy::dotenv().ok();

    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            return Some(url);
        }
    }

    let server = std::env::var("POSTGRES_SERVER").unwrap_or_else(|_| "localhost".into());
    let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
    let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "eduaccess".into());
    let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_default();
    let db = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "eduaccess_db".into());

    Some(format!("postgresql://{user}:{password}@{server}:{port}/{db}"))
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        anyhow::bail!("DATABASE_URL and POSTGRES_* are not set");
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let migrations_dir =
        std::env::var("EDUACCESS_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let tables = [
        "users",
        "student_profiles",
        "educator_profiles",
        "courses",
        "course_modules",
        "lessons",
        "quizzes",
        "questions",
        "answers",
        "enrollments",
        "lesson_completions",
        "quiz_submissions",
    ];

    for table in tables {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    Ok(())
}

#[tokio::test]
async fn enrollment_pairs_are_unique() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        anyhow::bail!("DATABASE_URL and POSTGRES_* are not set");
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let row = sqlx::query("SELECT COUNT(*) FROM pg_constraint WHERE conname = ANY($1)")
    .bind(vec![
        "uq_users_email",
        "uq_quizzes_lesson",
        "uq_enrollments_student_course",
        "uq_lesson_completions_student_lesson",
    ])
    .fetch_one(&pool)
    .await?;
    let count: i64 = row.try_get(0)?;
    assert_eq!(count, 4);

    Ok(())
}
