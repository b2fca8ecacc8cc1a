use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Course, Enrollment};
use crate::db::types::CourseLevel;
use crate::schemas::curriculum::ModuleResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(
        length(min = 1, max = 200, message = "title must be 1-200 characters"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) level: CourseLevel,
    /// Stored file reference; uploads happen elsewhere.
    #[serde(default)]
    #[validate(length(max = 255, message = "thumbnail must be at most 255 characters"))]
    pub(crate) thumbnail: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublished")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseUpdate {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200, message = "title must be 1-200 characters"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) level: Option<CourseLevel>,
    #[serde(default)]
    #[validate(length(max = 255, message = "thumbnail must be at most 255 characters"))]
    pub(crate) thumbnail: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublished")]
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) educator_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) educator_name: Option<String>,
    pub(crate) is_published: bool,
    pub(crate) category: String,
    pub(crate) level: CourseLevel,
    pub(crate) thumbnail: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            educator_id: course.educator_id,
            educator_name: None,
            is_published: course.is_published,
            category: course.category,
            level: course.level,
            thumbnail: course.thumbnail,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }

    pub(crate) fn with_educator(course: Course, educator_name: String) -> Self {
        Self { educator_name: Some(educator_name), ..Self::from_db(course) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailResponse {
    #[serde(flatten)]
    pub(crate) course: CourseResponse,
    pub(crate) modules: Vec<ModuleResponse>,
    pub(crate) is_owner: bool,
    /// Present for students only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_enrolled: Option<bool>,
    /// Present for the owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) enrollment_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) enrolled_at: String,
    pub(crate) completed: bool,
    pub(crate) progress: i32,
    pub(crate) already_enrolled: bool,
    pub(crate) message: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment, created: bool, course_title: &str) -> Self {
        let message = if created {
            format!("Successfully enrolled in {course_title}!")
        } else {
            format!("You are already enrolled in {course_title}.")
        };

        Self {
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            enrolled_at: format_primitive(enrollment.enrolled_at),
            completed: enrollment.completed,
            progress: enrollment.progress,
            already_enrolled: !created,
            message,
        }
    }
}
