use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::{parse_date, primitive_now_utc};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::profiles::{UpdateEducatorProfile, UpdateStudentProfile};
use crate::schemas::user::{ProfileDetails, ProfileResponse, ProfileUpdate, UserResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me/profile", get(get_profile).patch(update_profile))
}

async fn get_profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = match user.role {
        UserRole::Student => repositories::profiles::find_student(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load profile"))?
            .map(ProfileDetails::from_student),
        UserRole::Educator => repositories::profiles::find_educator(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load profile"))?
            .map(ProfileDetails::from_educator),
    };

    let profile = profile.ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(ProfileResponse { user: UserResponse::from_db(user), profile }))
}

async fn update_profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, ApiError> {
    validate_payload(&payload)?;

    let profile = match user.role {
        UserRole::Student => {
            if payload.expertise.is_some() || payload.website.is_some() {
                return Err(ApiError::UnprocessableEntity(
                    "expertise and website are only available to educators".to_string(),
                ));
            }
            let date_of_birth = match payload.date_of_birth.as_deref() {
                Some(value) => Some(parse_date(value).ok_or_else(|| {
                    ApiError::UnprocessableEntity(
                        "date_of_birth must use the YYYY-MM-DD format".to_string(),
                    )
                })?),
                None => None,
            };

            let profile = repositories::profiles::upsert_student(
                state.db(),
                &user.id,
                UpdateStudentProfile { bio: payload.bio.clone(), date_of_birth },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update profile"))?;
            ProfileDetails::from_student(profile)
        }
        UserRole::Educator => {
            if payload.date_of_birth.is_some() {
                return Err(ApiError::UnprocessableEntity(
                    "date_of_birth is only available to students".to_string(),
                ));
            }

            let profile = repositories::profiles::upsert_educator(
                state.db(),
                &user.id,
                UpdateEducatorProfile {
                    bio: payload.bio.clone(),
                    expertise: payload.expertise.clone(),
                    website: payload.website.clone(),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update profile"))?;
            ProfileDetails::from_educator(profile)
        }
    };

    let user = apply_full_name(&state, user, payload.full_name.as_deref()).await?;

    tracing::info!(user_id = %user.id, action = "update_profile", "Profile updated");

    Ok(Json(ProfileResponse { user: UserResponse::from_db(user), profile }))
}

async fn apply_full_name(
    state: &AppState,
    mut user: User,
    full_name: Option<&str>,
) -> Result<User, ApiError> {
    let Some(full_name) = full_name.map(str::trim) else {
        return Ok(user);
    };

    let now = primitive_now_utc();
    repositories::users::update_full_name(state.db(), &user.id, full_name, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update user"))?;

    user.full_name = full_name.to_string();
    user.updated_at = now;
    Ok(user)
}
