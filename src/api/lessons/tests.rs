use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::LessonContentType;
use crate::repositories;
use crate::test_support;

async fn completion_rows(pool: &sqlx::PgPool, student_id: &str, lesson_id: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM lesson_completions WHERE student_id = $1 AND lesson_id = $2",
    )
    .bind(student_id)
    .bind(lesson_id)
    .fetch_one(pool)
    .await
    .expect("count completions")
}

#[tokio::test]
async fn lesson_requires_enrollment_for_students() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let course = test_support::insert_course(ctx.state.db(), &owner.id, "Rust", true).await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics").await;
    let lesson =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Watch", LessonContentType::Video)
            .await;
    let token = test_support::bearer_token(&student, ctx.state.settings());
    let uri = format!("/api/v1/lessons/{}", lesson.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&token), None))
        .await
        .expect("get lesson");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    test_support::enroll(ctx.state.db(), &student.id, &course.id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&token), None))
        .await
        .expect("get lesson");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["embed_url"], "https://www.youtube.com/embed/dQw4w9WgXcQ");
    assert_eq!(body["is_owner"], false);
    assert_eq!(body["is_completed"], false);
    assert!(body["quiz_id"].is_null());
}

#[tokio::test]
async fn other_educators_cannot_open_lessons() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let other = test_support::insert_educator(ctx.state.db(), "other@example.com").await;
    let course = test_support::insert_course(ctx.state.db(), &owner.id, "Rust", true).await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics").await;
    let lesson =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Read", LessonContentType::Text)
            .await;
    let uri = format!("/api/v1/lessons/{}", lesson.id);

    let other_token = test_support::bearer_token(&other, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&other_token), None))
        .await
        .expect("get lesson");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let owner_token = test_support::bearer_token(&owner, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&owner_token), None))
        .await
        .expect("get lesson");
    let body = test_support::read_json(response).await;
    assert_eq!(body["is_owner"], true);
    assert_eq!(body["text_content"], "Lesson body");
}

#[tokio::test]
async fn mark_complete_records_a_single_completion() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let course = test_support::insert_course(ctx.state.db(), &owner.id, "Rust", true).await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics").await;
    let lesson =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Read", LessonContentType::Text)
            .await;
    test_support::enroll(ctx.state.db(), &student.id, &course.id).await;
    let token = test_support::bearer_token(&student, ctx.state.settings());
    let uri = format!("/api/v1/lessons/{}/complete", lesson.id);

    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::POST, &uri, Some(&token), None))
            .await
            .expect("mark complete");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["recorded"], true);
        assert_eq!(body["progress"], 0);
    }

    assert_eq!(completion_rows(ctx.state.db(), &student.id, &lesson.id).await, 1);

    let enrollment = repositories::enrollments::find(ctx.state.db(), &student.id, &course.id)
        .await
        .expect("fetch enrollment")
        .expect("enrollment exists");
    assert_eq!(enrollment.progress, 0);
    assert!(!enrollment.completed);
}

#[tokio::test]
async fn mark_complete_without_enrollment_writes_nothing() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let course = test_support::insert_course(ctx.state.db(), &owner.id, "Rust", true).await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics").await;
    let lesson =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Read", LessonContentType::Text)
            .await;
    let token = test_support::bearer_token(&student, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("mark complete");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["recorded"], false);
    assert!(body["progress"].is_null());
    assert_eq!(completion_rows(ctx.state.db(), &student.id, &lesson.id).await, 0);
}

#[tokio::test]
async fn mark_complete_on_unpublished_course_writes_nothing() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let course = test_support::insert_course(ctx.state.db(), &owner.id, "Rust", true).await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics").await;
    let lesson =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Read", LessonContentType::Text)
            .await;
    test_support::enroll(ctx.state.db(), &student.id, &course.id).await;

    let owner_token = test_support::bearer_token(&owner, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/courses/{}", course.id),
            Some(&owner_token),
            Some(json!({ "is_published": false })),
        ))
        .await
        .expect("unpublish course");
    assert_eq!(response.status(), StatusCode::OK);

    let token = test_support::bearer_token(&student, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("mark complete");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["recorded"], false);
    assert_eq!(completion_rows(ctx.state.db(), &student.id, &lesson.id).await, 0);
}

#[tokio::test]
async fn create_quiz_is_idempotent_per_lesson() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let course = test_support::insert_course(ctx.state.db(), &owner.id, "Rust", true).await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics").await;
    let lesson =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Check", LessonContentType::Quiz)
            .await;
    let token = test_support::bearer_token(&owner, ctx.state.settings());
    let uri = format!("/api/v1/lessons/{}/quiz", lesson.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "title": "Checkpoint" })),
        ))
        .await
        .expect("create quiz");
    let status = response.status();
    let first = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {first}");
    assert_eq!(first["passing_score"], 70);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "title": "Second attempt", "passing_score": 90 })),
        ))
        .await
        .expect("create quiz again");
    let status = response.status();
    let second = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["title"], "Checkpoint");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/lessons/{}", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("get lesson");
    let body = test_support::read_json(response).await;
    assert_eq!(body["quiz_id"], first["id"]);
}

#[tokio::test]
async fn create_quiz_rejects_non_quiz_lessons() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let course = test_support::insert_course(ctx.state.db(), &owner.id, "Rust", true).await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics").await;
    let lesson =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Read", LessonContentType::Text)
            .await;
    let token = test_support::bearer_token(&owner, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/quiz", lesson.id),
            Some(&token),
            Some(json!({ "title": "Checkpoint" })),
        ))
        .await
        .expect("create quiz");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let quiz_id = repositories::quizzes::find_id_by_lesson(ctx.state.db(), &lesson.id)
        .await
        .expect("fetch quiz");
    assert!(quiz_id.is_none());
}
