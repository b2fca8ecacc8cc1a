//! Ownership and enrollment rules shared by every curriculum endpoint.

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories::ownership::CourseOwnership;

pub(crate) fn can_edit(user: &User, course: &CourseOwnership) -> bool {
    user.id == course.educator_id
}

/// Lesson content is open to the course owner and to enrolled students of a
/// published course.
pub(crate) fn can_access_lesson(user: &User, course: &CourseOwnership, is_enrolled: bool) -> bool {
    if can_edit(user, course) {
        return true;
    }

    match user.role {
        UserRole::Student => course.is_published && is_enrolled,
        UserRole::Educator => false,
    }
}

/// Published courses are visible to everyone; drafts only to their owner.
pub(crate) fn can_view_course(user: &User, course: &CourseOwnership) -> bool {
    course.is_published || can_edit(user, course)
}
