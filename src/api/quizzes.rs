use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{self, CurrentEducator, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Answer, Quiz};
use crate::repositories;
use crate::repositories::ownership::CourseOwnership;
use crate::schemas::quiz::{
    QuestionCreate, QuestionResponse, QuizDetailResponse, QuizResponse, QuizSubmitRequest,
    SubmissionResponse, SubmissionResultResponse,
};
use crate::services::{access_policy, authoring, quiz_scoring};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:quiz_id", get(get_quiz))
        .route("/:quiz_id/questions", post(add_question))
        .route("/:quiz_id/submit", post(submit_quiz))
        .route("/:quiz_id/submissions", get(list_submissions))
        .route("/:quiz_id/submissions/last", get(last_submission))
}

async fn get_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuizDetailResponse>, ApiError> {
    let ownership = load_ownership(&state, &quiz_id).await?;
    guards::require_lesson_access(&state, &user, &ownership).await?;

    let quiz = load_quiz(&state, &quiz_id).await?;
    let questions = repositories::questions::list_by_quiz(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch questions"))?;
    let answers = repositories::questions::list_answers_by_quiz(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answers"))?;

    let is_owner = access_policy::can_edit(&user, &ownership);
    let total_points = questions.iter().map(|question| i64::from(question.points)).sum();

    let mut answers_by_question: HashMap<String, Vec<Answer>> = HashMap::new();
    for answer in answers {
        answers_by_question.entry(answer.question_id.clone()).or_default().push(answer);
    }

    let questions = questions
        .into_iter()
        .map(|question| {
            let answers = answers_by_question.remove(&question.id).unwrap_or_default();
            QuestionResponse::from_db(question, answers, is_owner)
        })
        .collect();

    Ok(Json(QuizDetailResponse {
        quiz: QuizResponse::from_db(quiz),
        course_id: ownership.course_id,
        questions,
        total_points,
        is_owner,
    }))
}

async fn add_question(
    Path(quiz_id): Path<String>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let ownership = load_ownership(&state, &quiz_id).await?;
    guards::require_course_owner(&educator, &ownership, "You can only edit your own quizzes")?;
    validate_payload(&payload)?;

    let answers =
        authoring::build_answers(payload.question_type, &payload.answers, payload.correct_answer)?;

    let (question, answers) = repositories::questions::create_with_answers(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            quiz_id: &quiz_id,
            question_text: payload.question_text.trim(),
            question_type: payload.question_type,
            position: payload.order,
            points: payload.points,
            created_at: primitive_now_utc(),
        },
        answers,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    tracing::info!(
        course_id = %ownership.course_id,
        quiz_id = %quiz_id,
        question_id = %question.id,
        answers = answers.len(),
        action = "add_question",
        "Question created"
    );

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question, answers, true))))
}

async fn submit_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuizSubmitRequest>,
) -> Result<Json<SubmissionResultResponse>, ApiError> {
    let ownership = load_ownership(&state, &quiz_id).await?;
    guards::require_lesson_access(&state, &user, &ownership).await?;

    let quiz = load_quiz(&state, &quiz_id).await?;
    let questions = repositories::questions::list_by_quiz(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch questions"))?;
    let answers = repositories::questions::list_answers_by_quiz(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answers"))?;

    let outcome =
        quiz_scoring::score_attempt(&questions, &answers, &payload.answers, quiz.passing_score);
    let message = quiz_scoring::result_message(&outcome, quiz.passing_score);

    // Owner attempts are previews and leave no record.
    let submission = if access_policy::can_edit(&user, &ownership) {
        None
    } else {
        let submission = repositories::quiz_submissions::create(
            state.db(),
            repositories::quiz_submissions::CreateSubmission {
                id: &Uuid::new_v4().to_string(),
                student_id: &user.id,
                quiz_id: &quiz_id,
                score: outcome.percentage,
                passed: outcome.passed,
                submitted_at: primitive_now_utc(),
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store submission"))?;
        metrics::record_quiz_submission(outcome.passed);
        Some(submission)
    };

    tracing::info!(
        course_id = %ownership.course_id,
        quiz_id = %quiz_id,
        student_id = %user.id,
        score = outcome.percentage,
        passed = outcome.passed,
        recorded = submission.is_some(),
        action = "submit_quiz",
        "Quiz scored"
    );

    Ok(Json(SubmissionResultResponse::new(&quiz, outcome, submission.as_ref(), message)))
}

async fn list_submissions(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let ownership = load_ownership(&state, &quiz_id).await?;
    guards::require_lesson_access(&state, &user, &ownership).await?;

    let rows = if access_policy::can_edit(&user, &ownership) {
        repositories::quiz_submissions::list_for_quiz(state.db(), &quiz_id).await
    } else {
        repositories::quiz_submissions::list_for_student(state.db(), &user.id, &quiz_id).await
    };
    let rows = rows.map_err(|e| ApiError::internal(e, "Failed to fetch submissions"))?;

    Ok(Json(
        rows.into_iter()
            .map(|row| SubmissionResponse::from_db(row.submission, Some(row.student_name)))
            .collect(),
    ))
}

async fn last_submission(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Option<SubmissionResponse>>, ApiError> {
    let ownership = load_ownership(&state, &quiz_id).await?;
    guards::require_lesson_access(&state, &user, &ownership).await?;

    let submission = repositories::quiz_submissions::find_last(state.db(), &user.id, &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?;

    Ok(Json(submission.map(|row| SubmissionResponse::from_db(row, None))))
}

async fn load_ownership(state: &AppState, quiz_id: &str) -> Result<CourseOwnership, ApiError> {
    repositories::ownership::for_quiz(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(quiz_not_found)
}

async fn load_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(quiz_not_found)
}

fn quiz_not_found() -> ApiError {
    ApiError::NotFound("Quiz not found".to_string())
}

#[cfg(test)]
mod tests;
