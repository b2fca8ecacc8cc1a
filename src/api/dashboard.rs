use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::course::CourseResponse;
use crate::schemas::dashboard::{DashboardResponse, EnrolledCourse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

async fn dashboard(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let response = match user.role {
        UserRole::Student => {
            let rows = repositories::enrollments::list_for_student(state.db(), &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load enrollments"))?;
            let completed_courses = rows.iter().filter(|row| row.completed).count();
            let enrollments: Vec<EnrolledCourse> =
                rows.into_iter().map(EnrolledCourse::from_row).collect();

            DashboardResponse::Student {
                total_courses: enrollments.len(),
                completed_courses,
                enrollments,
            }
        }
        UserRole::Educator => {
            let courses = repositories::courses::list_by_educator(state.db(), &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load courses"))?;
            let total_students =
                repositories::courses::count_students_for_educator(state.db(), &user.id)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to count students"))?;
            let courses: Vec<CourseResponse> =
                courses.into_iter().map(CourseResponse::from_db).collect();

            DashboardResponse::Educator { total_courses: courses.len(), courses, total_students }
        }
    };

    Ok(Json(response))
}
