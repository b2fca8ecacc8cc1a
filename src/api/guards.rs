use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::ownership::CourseOwnership;
use crate::services::access_policy;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentEducator(pub(crate) User);
pub(crate) struct CurrentStudent(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active || user.role != claims.role {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentEducator {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        match user.role {
            UserRole::Educator => Ok(CurrentEducator(user)),
            UserRole::Student => Err(ApiError::Forbidden("Only educators can perform this action")),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        match user.role {
            UserRole::Student => Ok(CurrentStudent(user)),
            UserRole::Educator => Err(ApiError::Forbidden("Only students can perform this action")),
        }
    }
}

pub(crate) fn require_course_owner(
    user: &User,
    course: &CourseOwnership,
    message: &'static str,
) -> Result<(), ApiError> {
    if access_policy::can_edit(user, course) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(message))
    }
}

pub(crate) async fn is_enrolled(
    state: &AppState,
    user: &User,
    course: &CourseOwnership,
) -> Result<bool, ApiError> {
    match user.role {
        UserRole::Student => repositories::enrollments::exists(state.db(), &user.id, &course.course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check enrollment")),
        UserRole::Educator => Ok(false),
    }
}

/// Lesson and quiz content gate: the owner, or an enrolled student.
pub(crate) async fn require_lesson_access(
    state: &AppState,
    user: &User,
    course: &CourseOwnership,
) -> Result<(), ApiError> {
    let enrolled = is_enrolled(state, user, course).await?;

    if access_policy::can_access_lesson(user, course, enrolled) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("You must be enrolled in this course to access its content"))
    }
}
