use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::{EducatorProfile, StudentProfile, User};
use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserCreate {
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[serde(alias = "fullName")]
    #[validate(
        length(min = 1, max = 255, message = "full_name must not be empty"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) full_name: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters long"))]
    pub(crate) password: String,
    #[serde(alias = "passwordConfirm")]
    pub(crate) password_confirm: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLogin {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum ProfileDetails {
    Student { bio: String, date_of_birth: Option<String> },
    Educator { bio: String, expertise: String, website: String },
}

impl ProfileDetails {
    pub(crate) fn from_student(profile: StudentProfile) -> Self {
        Self::Student { bio: profile.bio, date_of_birth: profile.date_of_birth.map(format_date) }
    }

    pub(crate) fn from_educator(profile: EducatorProfile) -> Self {
        Self::Educator { bio: profile.bio, expertise: profile.expertise, website: profile.website }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    pub(crate) user: UserResponse,
    pub(crate) profile: ProfileDetails,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct ProfileUpdate {
    #[serde(default)]
    #[serde(alias = "fullName")]
    #[validate(
        length(min = 1, max = 255, message = "full_name must not be empty"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) full_name: Option<String>,
    #[serde(default)]
    pub(crate) bio: Option<String>,
    /// Student only, `YYYY-MM-DD`.
    #[serde(default)]
    #[serde(alias = "dateOfBirth")]
    pub(crate) date_of_birth: Option<String>,
    /// Educator only.
    #[serde(default)]
    #[validate(length(max = 200, message = "expertise must be at most 200 characters"))]
    pub(crate) expertise: Option<String>,
    /// Educator only.
    #[serde(default)]
    #[validate(url(message = "website must be a valid URL"))]
    pub(crate) website: Option<String>,
}
