use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::test_support;

async fn submission_rows(pool: &sqlx::PgPool, quiz_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM quiz_submissions WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_one(pool)
        .await
        .expect("count submissions")
}

async fn submit(
    ctx: &test_support::TestContext,
    token: &str,
    quiz_id: &str,
    answers: Value,
) -> (StatusCode, Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/quizzes/{quiz_id}/submit"),
            Some(token),
            Some(json!({ "answers": answers })),
        ))
        .await
        .expect("submit quiz");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

#[tokio::test]
async fn student_submission_is_scored_and_recorded() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let (q1, a1) =
        test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 2, &[("A", true), ("B", false)])
            .await;
    let (q2, a2) =
        test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 3, &[("C", false), ("D", true)])
            .await;
    test_support::enroll(ctx.state.db(), &student.id, &fixture.course.id).await;
    let token = test_support::bearer_token(&student, ctx.state.settings());

    let (status, body) = submit(
        &ctx,
        &token,
        &fixture.quiz.id,
        json!({ q1.id.clone(): a1[0].id.clone(), q2.id.clone(): a2[0].id.clone() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["points_earned"], 2);
    assert_eq!(body["total_points"], 5);
    assert_eq!(body["score"], 40.0);
    assert_eq!(body["passed"], false);
    assert_eq!(body["recorded"], true);
    assert_eq!(body["message"], "You scored 40.0%. A score of 70% is required to pass.");
    assert_eq!(submission_rows(ctx.state.db(), &fixture.quiz.id).await, 1);
}

#[tokio::test]
async fn empty_submission_scores_zero() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 1, &[("A", true), ("B", false)])
        .await;
    test_support::enroll(ctx.state.db(), &student.id, &fixture.course.id).await;
    let token = test_support::bearer_token(&student, ctx.state.settings());

    let (status, body) = submit(&ctx, &token, &fixture.quiz.id, json!({})).await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["score"], 0.0);
    assert_eq!(body["passed"], false);
}

#[tokio::test]
async fn score_equal_to_passing_threshold_passes() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let (right, right_answers) =
        test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 7, &[("A", true), ("B", false)])
            .await;
    test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 3, &[("C", true), ("D", false)])
        .await;
    test_support::enroll(ctx.state.db(), &student.id, &fixture.course.id).await;
    let token = test_support::bearer_token(&student, ctx.state.settings());

    let (status, body) = submit(
        &ctx,
        &token,
        &fixture.quiz.id,
        json!({ right.id.clone(): right_answers[0].id.clone() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["score"], 70.0);
    assert_eq!(body["passed"], true);
}

#[tokio::test]
async fn owner_preview_is_not_recorded() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let (question, answers) =
        test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 1, &[("A", true), ("B", false)])
            .await;
    let token = test_support::bearer_token(&owner, ctx.state.settings());

    let (status, body) = submit(
        &ctx,
        &token,
        &fixture.quiz.id,
        json!({ question.id.clone(): answers[0].id.clone() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["score"], 100.0);
    assert_eq!(body["recorded"], false);
    assert!(body["submission_id"].is_null());
    assert_eq!(submission_rows(ctx.state.db(), &fixture.quiz.id).await, 0);
}

#[tokio::test]
async fn unenrolled_student_and_other_educator_cannot_submit() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let other = test_support::insert_educator(ctx.state.db(), "other@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;

    let student_token = test_support::bearer_token(&student, ctx.state.settings());
    let (status, _) = submit(&ctx, &student_token, &fixture.quiz.id, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let other_token = test_support::bearer_token(&other, ctx.state.settings());
    let (status, _) = submit(&ctx, &other_token, &fixture.quiz.id, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(submission_rows(ctx.state.db(), &fixture.quiz.id).await, 0);
}

#[tokio::test]
async fn every_attempt_is_kept_and_last_is_newest() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let (question, answers) =
        test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 1, &[("A", true), ("B", false)])
            .await;
    test_support::enroll(ctx.state.db(), &student.id, &fixture.course.id).await;
    let token = test_support::bearer_token(&student, ctx.state.settings());
    let last_uri = format!("/api/v1/quizzes/{}/submissions/last", fixture.quiz.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &last_uri, Some(&token), None))
        .await
        .expect("last submission");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(test_support::read_json(response).await.is_null());

    submit(&ctx, &token, &fixture.quiz.id, json!({ question.id.clone(): answers[1].id.clone() }))
        .await;
    let (_, second) = submit(
        &ctx,
        &token,
        &fixture.quiz.id,
        json!({ question.id.clone(): answers[0].id.clone() }),
    )
    .await;
    assert_eq!(submission_rows(ctx.state.db(), &fixture.quiz.id).await, 2);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &last_uri, Some(&token), None))
        .await
        .expect("last submission");
    let last = test_support::read_json(response).await;
    assert_eq!(last["id"], second["submission_id"]);
    assert_eq!(last["score"], 100.0);
    assert_eq!(last["passed"], true);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quizzes/{}/submissions", fixture.quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list submissions");
    let list = test_support::read_json(response).await;
    assert_eq!(list.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn owner_sees_all_student_submissions() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let first = test_support::insert_student(ctx.state.db(), "first@example.com").await;
    let second = test_support::insert_student(ctx.state.db(), "second@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    for student in [&first, &second] {
        test_support::enroll(ctx.state.db(), &student.id, &fixture.course.id).await;
        let token = test_support::bearer_token(student, ctx.state.settings());
        submit(&ctx, &token, &fixture.quiz.id, json!({})).await;
    }

    let first_token = test_support::bearer_token(&first, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quizzes/{}/submissions", fixture.quiz.id),
            Some(&first_token),
            None,
        ))
        .await
        .expect("list own submissions");
    let own = test_support::read_json(response).await;
    assert_eq!(own.as_array().map(Vec::len), Some(1));
    assert_eq!(own[0]["student_id"], first.id);

    let owner_token = test_support::bearer_token(&owner, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quizzes/{}/submissions", fixture.quiz.id),
            Some(&owner_token),
            None,
        ))
        .await
        .expect("list all submissions");
    let all = test_support::read_json(response).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn add_question_builds_answers_from_slots() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let token = test_support::bearer_token(&owner, ctx.state.settings());
    let uri = format!("/api/v1/quizzes/{}/questions", fixture.quiz.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({
                "question_text": "Which keyword borrows mutably?",
                "question_type": "multiple_choice",
                "points": 2,
                "answers": ["&mut", "", "&", "box"],
                "correct_answer": 0
            })),
        ))
        .await
        .expect("add question");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["order"], 1);
    let answers = body["answers"].as_array().expect("answers");
    assert_eq!(answers.len(), 3);
    assert_eq!(answers.iter().filter(|answer| answer["is_correct"] == true).count(), 1);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({
                "question_text": "Rust has a garbage collector",
                "question_type": "true_false",
                "correct_answer": 1
            })),
        ))
        .await
        .expect("add true/false question");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["order"], 2);
    assert_eq!(body["answers"][0]["answer_text"], "True");
    assert_eq!(body["answers"][1]["answer_text"], "False");
    assert_eq!(body["answers"][1]["is_correct"], true);
}

#[tokio::test]
async fn add_question_rejects_blank_correct_slot() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let token = test_support::bearer_token(&owner, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/quizzes/{}/questions", fixture.quiz.id),
            Some(&token),
            Some(json!({
                "question_text": "Pick one",
                "question_type": "multiple_choice",
                "answers": ["A", "", "C"],
                "correct_answer": 1
            })),
        ))
        .await
        .expect("add question");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = $1")
        .bind(&fixture.quiz.id)
        .fetch_one(ctx.state.db())
        .await
        .expect("count questions");
    assert_eq!(questions, 0);
}

#[tokio::test]
async fn students_do_not_see_correct_answers() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    test_support::insert_question(ctx.state.db(), &fixture.quiz.id, 4, &[("A", true), ("B", false)])
        .await;
    test_support::enroll(ctx.state.db(), &student.id, &fixture.course.id).await;
    let uri = format!("/api/v1/quizzes/{}", fixture.quiz.id);

    let student_token = test_support::bearer_token(&student, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&student_token), None))
        .await
        .expect("get quiz");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["total_points"], 4);
    assert_eq!(body["is_owner"], false);
    assert_eq!(body["lesson_id"], fixture.lesson.id);
    assert!(body["questions"][0]["answers"][0].get("is_correct").is_none());

    let owner_token = test_support::bearer_token(&owner, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&owner_token), None))
        .await
        .expect("get quiz");
    let body = test_support::read_json(response).await;
    assert_eq!(body["questions"][0]["answers"][0]["is_correct"], true);
}

#[tokio::test]
async fn add_question_rejects_blank_text_and_overlong_answers() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let token = test_support::bearer_token(&owner, ctx.state.settings());
    let uri = format!("/api/v1/quizzes/{}/questions", fixture.quiz.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({
                "question_text": "  ",
                "question_type": "true_false",
                "correct_answer": 0
            })),
        ))
        .await
        .expect("add blank question");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({
                "question_text": "Pick one",
                "question_type": "multiple_choice",
                "answers": ["x".repeat(501), "b"],
                "correct_answer": 1
            })),
        ))
        .await
        .expect("add question with long answer");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "response: {body}");
    assert!(body["detail"].as_str().unwrap_or_default().contains("answers[0]"));

    let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = $1")
        .bind(&fixture.quiz.id)
        .fetch_one(ctx.state.db())
        .await
        .expect("count questions");
    assert_eq!(questions, 0);
}

#[tokio::test]
async fn last_submission_breaks_timestamp_ties_by_insertion_order() {
    let ctx = test_support::setup_test_context().await;
    let owner = test_support::insert_educator(ctx.state.db(), "owner@example.com").await;
    let student = test_support::insert_student(ctx.state.db(), "student@example.com").await;
    let fixture = test_support::insert_quiz_fixture(ctx.state.db(), &owner.id, 70).await;
    let submitted_at = primitive_now_utc();

    let mut latest_id = String::new();
    let attempts = [
        ("ffffffff-0000-0000-0000-000000000000", 10.0),
        ("00000000-0000-0000-0000-000000000000", 90.0),
    ];
    for (id, score) in attempts {
        let submission = repositories::quiz_submissions::create(
            ctx.state.db(),
            repositories::quiz_submissions::CreateSubmission {
                id,
                student_id: &student.id,
                quiz_id: &fixture.quiz.id,
                score,
                passed: score >= 70.0,
                submitted_at,
            },
        )
        .await
        .expect("insert submission");
        latest_id = submission.id;
    }

    let last =
        repositories::quiz_submissions::find_last(ctx.state.db(), &student.id, &fixture.quiz.id)
            .await
            .expect("fetch last")
            .expect("submission exists");
    assert_eq!(last.id, latest_id);
    assert_eq!(last.score, 90.0);
}
