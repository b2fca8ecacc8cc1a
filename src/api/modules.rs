use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{self, CurrentEducator};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::curriculum::{LessonContext, LessonCreate, LessonResponse};
use crate::services::authoring::normalize_lesson_payload;
use crate::services::video_embed::youtube_embed_url;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:module_id/lessons", post(create_lesson))
}

async fn create_lesson(
    Path(module_id): Path<String>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> Result<(StatusCode, Json<LessonResponse>), ApiError> {
    let ownership = repositories::ownership::for_module(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;
    guards::require_course_owner(&educator, &ownership, "You can only edit your own courses")?;

    validate_payload(&payload)?;
    let content = normalize_lesson_payload(
        payload.content_type,
        payload.text_content.as_deref(),
        payload.video_url.as_deref(),
        payload.pdf_file.as_deref(),
    )?;

    let lesson = repositories::lessons::create(
        state.db(),
        repositories::lessons::CreateLesson {
            id: &Uuid::new_v4().to_string(),
            module_id: &module_id,
            title: payload.title.trim(),
            content_type: payload.content_type,
            position: payload.order,
            text_content: &content.text_content,
            video_url: &content.video_url,
            pdf_file: content.pdf_file.as_deref(),
            duration_minutes: payload.duration_minutes,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create lesson"))?;

    tracing::info!(
        course_id = %ownership.course_id,
        lesson_id = %lesson.id,
        action = "create_lesson",
        "Lesson created"
    );

    let embed_url = youtube_embed_url(&lesson.video_url);
    let context = LessonContext {
        course_id: ownership.course_id,
        embed_url,
        quiz_id: None,
        is_owner: true,
        is_completed: None,
    };

    Ok((StatusCode::CREATED, Json(LessonResponse::from_db(lesson, context))))
}
