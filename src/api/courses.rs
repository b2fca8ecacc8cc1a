use std::collections::HashMap;

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
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::ownership::CourseOwnership;
use crate::schemas::course::{
    CourseCreate, CourseDetailResponse, CourseResponse, CourseUpdate, EnrollmentResponse,
};
use crate::schemas::curriculum::{LessonSummary, ModuleCreate, ModuleResponse};
use crate::services::access_policy;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:course_id", get(get_course).patch(update_course).delete(delete_course))
        .route("/:course_id/enroll", post(enroll))
        .route("/:course_id/modules", post(create_module))
}

async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let rows = repositories::courses::list_published(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(
        rows.into_iter()
            .map(|row| CourseResponse::with_educator(row.course, row.educator_name))
            .collect(),
    ))
}

async fn create_course(
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    validate_payload(&payload)?;

    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            title: payload.title.trim(),
            description: &payload.description,
            educator_id: &educator.id,
            is_published: payload.is_published,
            category: payload.category.trim(),
            level: payload.level,
            thumbnail: payload.thumbnail.as_deref(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    tracing::info!(
        course_id = %course.id,
        educator_id = %educator.id,
        action = "create_course",
        "Course created"
    );

    Ok((StatusCode::CREATED, Json(CourseResponse::with_educator(course, educator.full_name))))
}

async fn get_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let row = repositories::courses::find_with_educator(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(course_not_found)?;

    let ownership = CourseOwnership {
        course_id: row.course.id.clone(),
        educator_id: row.course.educator_id.clone(),
        is_published: row.course.is_published,
    };
    if !access_policy::can_view_course(&user, &ownership) {
        return Err(course_not_found());
    }

    let is_owner = access_policy::can_edit(&user, &ownership);
    let modules = load_modules(&state, &course_id).await?;

    let (is_enrolled, enrollment_count) = if is_owner {
        let count = repositories::enrollments::count_by_course(state.db(), &course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count enrollments"))?;
        (None, Some(count))
    } else {
        match user.role {
            UserRole::Student => {
                (Some(guards::is_enrolled(&state, &user, &ownership).await?), None)
            }
            UserRole::Educator => (None, None),
        }
    };

    Ok(Json(CourseDetailResponse {
        course: CourseResponse::with_educator(row.course, row.educator_name),
        modules,
        is_owner,
        is_enrolled,
        enrollment_count,
    }))
}

async fn update_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    let ownership = load_ownership(&state, &course_id).await?;
    guards::require_course_owner(&user, &ownership, "You can only edit your own courses")?;
    validate_payload(&payload)?;

    let course = repositories::courses::update(
        state.db(),
        &course_id,
        repositories::courses::UpdateCourse {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            is_published: payload.is_published,
            category: payload.category.map(|category| category.trim().to_string()),
            level: payload.level,
            thumbnail: payload.thumbnail,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update course"))?;

    tracing::info!(course_id = %course.id, action = "update_course", "Course updated");

    Ok(Json(CourseResponse::with_educator(course, user.full_name)))
}

async fn delete_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let ownership = load_ownership(&state, &course_id).await?;
    guards::require_course_owner(&user, &ownership, "You can only delete your own courses")?;

    let deleted = repositories::courses::delete(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;
    if !deleted {
        return Err(course_not_found());
    }

    tracing::info!(course_id = %course_id, action = "delete_course", "Course deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn enroll(
    Path(course_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .filter(|course| course.is_published)
        .ok_or_else(course_not_found)?;

    let (enrollment, created) = repositories::enrollments::get_or_create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &student.id,
        &course.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to enroll"))?;

    metrics::record_enrollment(created);
    tracing::info!(
        course_id = %course.id,
        student_id = %student.id,
        created,
        action = "enroll",
        "Enrollment resolved"
    );

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(EnrollmentResponse::from_db(enrollment, created, &course.title))))
}

async fn create_module(
    Path(course_id): Path<String>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> Result<(StatusCode, Json<ModuleResponse>), ApiError> {
    let ownership = load_ownership(&state, &course_id).await?;
    guards::require_course_owner(&educator, &ownership, "You can only edit your own courses")?;
    validate_payload(&payload)?;

    let module = repositories::modules::create(
        state.db(),
        repositories::modules::CreateModule {
            id: &Uuid::new_v4().to_string(),
            course_id: &course_id,
            title: payload.title.trim(),
            description: &payload.description,
            position: payload.order,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create module"))?;

    tracing::info!(
        course_id = %course_id,
        module_id = %module.id,
        action = "create_module",
        "Module created"
    );

    Ok((StatusCode::CREATED, Json(ModuleResponse::from_db(module, Vec::new()))))
}

async fn load_ownership(state: &AppState, course_id: &str) -> Result<CourseOwnership, ApiError> {
    repositories::ownership::for_course(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(course_not_found)
}

async fn load_modules(state: &AppState, course_id: &str) -> Result<Vec<ModuleResponse>, ApiError> {
    let modules = repositories::modules::list_by_course(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch modules"))?;
    let lessons = repositories::lessons::list_by_course(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lessons"))?;

    let mut lessons_by_module: HashMap<String, Vec<LessonSummary>> = HashMap::new();
    for lesson in &lessons {
        lessons_by_module
            .entry(lesson.module_id.clone())
            .or_default()
            .push(LessonSummary::from_db(lesson));
    }

    Ok(modules
        .into_iter()
        .map(|module| {
            let lessons = lessons_by_module.remove(&module.id).unwrap_or_default();
            ModuleResponse::from_db(module, lessons)
        })
        .collect())
}

fn course_not_found() -> ApiError {
    ApiError::NotFound("Course not found".to_string())
}
