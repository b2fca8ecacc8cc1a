use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{self, CurrentEducator, CurrentStudent, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{LessonContentType, UserRole};
use crate::repositories;
use crate::repositories::ownership::CourseOwnership;
use crate::schemas::curriculum::{CompletionResponse, LessonContext, LessonResponse};
use crate::schemas::quiz::{QuizCreate, QuizResponse};
use crate::services::progress::{ProgressPolicy, ProgressSnapshot};
use crate::services::video_embed::youtube_embed_url;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:lesson_id", get(get_lesson))
        .route("/:lesson_id/complete", post(mark_complete))
        .route("/:lesson_id/quiz", post(create_quiz))
}

async fn get_lesson(
    Path(lesson_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LessonResponse>, ApiError> {
    let ownership = load_ownership(&state, &lesson_id).await?;
    guards::require_lesson_access(&state, &user, &ownership).await?;

    let lesson = repositories::lessons::find_by_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(lesson_not_found)?;

    let quiz_id = repositories::quizzes::find_id_by_lesson(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?;

    let is_completed = match user.role {
        UserRole::Student => Some(
            repositories::completions::exists(state.db(), &user.id, &lesson_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch completion"))?,
        ),
        UserRole::Educator => None,
    };

    let context = LessonContext {
        course_id: ownership.course_id.clone(),
        embed_url: youtube_embed_url(&lesson.video_url),
        quiz_id,
        is_owner: ownership.educator_id == user.id,
        is_completed,
    };

    Ok(Json(LessonResponse::from_db(lesson, context)))
}

/// Records a completion for an enrolled student of a published course.
/// Otherwise nothing is written and the call still succeeds.
async fn mark_complete(
    Path(lesson_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let ownership = load_ownership(&state, &lesson_id).await?;

    // Unpublished courses count as not enrolled.
    let enrollment = if ownership.is_published {
        repositories::enrollments::find(state.db(), &student.id, &ownership.course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?
    } else {
        None
    };

    let Some(enrollment) = enrollment else {
        tracing::debug!(
            lesson_id = %lesson_id,
            student_id = %student.id,
            is_published = ownership.is_published,
            "Completion ignored without course access"
        );
        return Ok(Json(CompletionResponse { lesson_id, recorded: false, progress: None }));
    };

    let inserted = repositories::completions::insert_if_absent(
        state.db(),
        &Uuid::new_v4().to_string(),
        &student.id,
        &lesson_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to record completion"))?;

    let progress = apply_progress_policy(&state, &student.id, &ownership, enrollment.id.as_str())
        .await?
        .unwrap_or(enrollment.progress);

    tracing::info!(
        course_id = %ownership.course_id,
        lesson_id = %lesson_id,
        student_id = %student.id,
        inserted,
        action = "complete_lesson",
        "Lesson completion recorded"
    );

    Ok(Json(CompletionResponse { lesson_id, recorded: true, progress: Some(progress) }))
}

async fn apply_progress_policy(
    state: &AppState,
    student_id: &str,
    ownership: &CourseOwnership,
    enrollment_id: &str,
) -> Result<Option<i32>, ApiError> {
    let completed_lessons =
        repositories::completions::count_for_course(state.db(), student_id, &ownership.course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count completions"))?;
    let total_lessons = repositories::lessons::count_by_course(state.db(), &ownership.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count lessons"))?;

    let snapshot = ProgressSnapshot { completed_lessons, total_lessons };
    let Some(progress) = ProgressPolicy::default().next_progress(snapshot) else {
        return Ok(None);
    };

    repositories::enrollments::set_progress(state.db(), enrollment_id, progress)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update progress"))?;
    Ok(Some(progress))
}

async fn create_quiz(
    Path(lesson_id): Path<String>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    let ownership = load_ownership(&state, &lesson_id).await?;
    guards::require_course_owner(&educator, &ownership, "You can only edit your own courses")?;
    validate_payload(&payload)?;

    let lesson = repositories::lessons::find_by_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(lesson_not_found)?;
    if lesson.content_type != LessonContentType::Quiz {
        return Err(ApiError::UnprocessableEntity(
            "content_type: quizzes can only be attached to quiz lessons".to_string(),
        ));
    }

    let passing_score =
        payload.passing_score.unwrap_or(state.settings().quiz().default_passing_score);

    let (quiz, created) = repositories::quizzes::get_or_create(
        state.db(),
        repositories::quizzes::CreateQuiz {
            id: &Uuid::new_v4().to_string(),
            lesson_id: &lesson_id,
            title: payload.title.trim(),
            description: &payload.description,
            passing_score,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    tracing::info!(
        course_id = %ownership.course_id,
        quiz_id = %quiz.id,
        created,
        action = "create_quiz",
        "Quiz resolved"
    );

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(QuizResponse::from_db(quiz))))
}

async fn load_ownership(state: &AppState, lesson_id: &str) -> Result<CourseOwnership, ApiError> {
    repositories::ownership::for_lesson(state.db(), lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(lesson_not_found)
}

fn lesson_not_found() -> ApiError {
    ApiError::NotFound("Lesson not found".to_string())
}

#[cfg(test)]
mod tests;
