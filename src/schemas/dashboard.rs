use serde::Serialize;

use crate::core::time::format_primitive;
use crate::repositories::enrollments::EnrolledCourseRow;
use crate::schemas::course::CourseResponse;

#[derive(Debug, Serialize)]
pub(crate) struct EnrolledCourse {
    #[serde(flatten)]
    pub(crate) course: CourseResponse,
    pub(crate) enrolled_at: String,
    pub(crate) completed: bool,
    pub(crate) progress: i32,
}

impl EnrolledCourse {
    pub(crate) fn from_row(row: EnrolledCourseRow) -> Self {
        Self {
            course: CourseResponse::from_db(row.course),
            enrolled_at: format_primitive(row.enrolled_at),
            completed: row.completed,
            progress: row.progress,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub(crate) enum DashboardResponse {
    Student {
        enrollments: Vec<EnrolledCourse>,
        total_courses: usize,
        completed_courses: usize,
    },
    Educator {
        courses: Vec<CourseResponse>,
        total_courses: usize,
        total_students: i64,
    },
}
