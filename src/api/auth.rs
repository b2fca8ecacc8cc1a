use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::{normalize_email, username_from_email, validate_payload};
use crate::core::redis::RateLimit;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::{self, models::User, types::UserRole};
use crate::repositories;
use crate::schemas::auth::TokenResponse;
use crate::schemas::user::{UserCreate, UserLogin, UserResponse};

const SIGNUP_RATE_LIMIT: RateLimit = RateLimit { scope: "signup", max_hits: 10, window_seconds: 60 };
const LOGIN_RATE_LIMIT: RateLimit = RateLimit { scope: "login", max_hits: 10, window_seconds: 60 };

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    validate_payload(&payload)?;
    if payload.password != payload.password_confirm {
        return Err(ApiError::UnprocessableEntity(
            "password_confirm: passwords do not match".to_string(),
        ));
    }

    let email = normalize_email(&payload.email);
    enforce_rate_limit(&state, SIGNUP_RATE_LIMIT, &email, "Too many signup attempts, try again later")
        .await?;

    let exists = repositories::users::exists_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if exists {
        return Err(ApiError::Conflict("A user with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = repositories::users::create_with_profile(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &email,
            username: &username_from_email(&email),
            full_name: payload.full_name.trim(),
            hashed_password,
            role: payload.role,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict("A user with this email already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create user")
        }
    })?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), action = "signup", "User registered");

    Ok((StatusCode::CREATED, Json(token_response(&state, user)?)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&payload.email);
    enforce_rate_limit(&state, LOGIN_RATE_LIMIT, &email, "Too many login attempts, try again later")
        .await?;

    let user = repositories::users::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;
    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    if !user.is_active {
        return Err(ApiError::Unauthorized("Inactive user"));
    }

    if user.role != payload.role {
        return Err(ApiError::Unauthorized(role_mismatch_message(user.role, payload.role)));
    }

    Ok(Json(token_response(&state, user)?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn enforce_rate_limit(
    state: &AppState,
    limit: RateLimit,
    subject: &str,
    message: &'static str,
) -> Result<(), ApiError> {
    let allowed = state.redis().check_rate_limit(limit, subject).await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, scope = limit.scope, "Rate limit check failed; allowing request");
        true
    });

    if allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests(message))
    }
}

fn token_response(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let token = security::create_access_token(&user.id, user.role, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    })
}

fn role_mismatch_message(actual: UserRole, requested: UserRole) -> &'static str {
    match (actual, requested) {
        (UserRole::Student, UserRole::Educator) => {
            "This account is registered as a student, not an educator"
        }
        (UserRole::Educator, UserRole::Student) => {
            "This account is registered as an educator, not a student"
        }
        (UserRole::Student, UserRole::Student) | (UserRole::Educator, UserRole::Educator) => {
            "Incorrect email or password"
        }
    }
}
