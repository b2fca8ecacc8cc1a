use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{CourseModule, Lesson};
use crate::db::types::LessonContentType;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ModuleCreate {
    #[validate(
        length(min = 1, max = 200, message = "title must be 1-200 characters"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "order must be non-negative"))]
    pub(crate) order: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModuleResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) order: i32,
    pub(crate) lessons: Vec<LessonSummary>,
}

impl ModuleResponse {
    pub(crate) fn from_db(module: CourseModule, lessons: Vec<LessonSummary>) -> Self {
        Self {
            id: module.id,
            course_id: module.course_id,
            title: module.title,
            description: module.description,
            order: module.position,
            lessons,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LessonCreate {
    #[validate(
        length(min = 1, max = 200, message = "title must be 1-200 characters"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) title: String,
    #[serde(alias = "contentType")]
    pub(crate) content_type: LessonContentType,
    #[serde(default)]
    #[validate(range(min = 0, message = "order must be non-negative"))]
    pub(crate) order: Option<i32>,
    #[serde(default)]
    #[serde(alias = "textContent")]
    pub(crate) text_content: Option<String>,
    #[serde(default)]
    #[serde(alias = "videoUrl")]
    #[validate(length(max = 500, message = "video_url must be at most 500 characters"))]
    pub(crate) video_url: Option<String>,
    /// Stored file reference for pdf lessons.
    #[serde(default)]
    #[serde(alias = "pdfFile")]
    #[validate(length(max = 255, message = "pdf_file must be at most 255 characters"))]
    pub(crate) pdf_file: Option<String>,
    #[serde(default)]
    #[serde(alias = "durationMinutes")]
    #[validate(range(min = 0, message = "duration_minutes must be non-negative"))]
    pub(crate) duration_minutes: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonSummary {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) content_type: LessonContentType,
    pub(crate) order: i32,
    pub(crate) duration_minutes: i32,
}

impl LessonSummary {
    pub(crate) fn from_db(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id.clone(),
            module_id: lesson.module_id.clone(),
            title: lesson.title.clone(),
            content_type: lesson.content_type,
            order: lesson.position,
            duration_minutes: lesson.duration_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonResponse {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) content_type: LessonContentType,
    pub(crate) order: i32,
    pub(crate) text_content: String,
    pub(crate) video_url: String,
    /// Embeddable form of `video_url`.
    pub(crate) embed_url: String,
    pub(crate) pdf_file: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) quiz_id: Option<String>,
    pub(crate) is_owner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_completed: Option<bool>,
    pub(crate) created_at: String,
}

pub(crate) struct LessonContext {
    pub(crate) course_id: String,
    pub(crate) embed_url: String,
    pub(crate) quiz_id: Option<String>,
    pub(crate) is_owner: bool,
    pub(crate) is_completed: Option<bool>,
}

impl LessonResponse {
    pub(crate) fn from_db(lesson: Lesson, context: LessonContext) -> Self {
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            course_id: context.course_id,
            title: lesson.title,
            content_type: lesson.content_type,
            order: lesson.position,
            text_content: lesson.text_content,
            video_url: lesson.video_url,
            embed_url: context.embed_url,
            pdf_file: lesson.pdf_file,
            duration_minutes: lesson.duration_minutes,
            quiz_id: context.quiz_id,
            is_owner: context.is_owner,
            is_completed: context.is_completed,
            created_at: format_primitive(lesson.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletionResponse {
    pub(crate) lesson_id: String,
    /// False when the student is not enrolled; nothing is stored then.
    pub(crate) recorded: bool,
    pub(crate) progress: Option<i32>,
}
