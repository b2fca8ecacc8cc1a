pub(crate) mod completions;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod health;
pub(crate) mod lessons;
pub(crate) mod modules;
pub(crate) mod ownership;
pub(crate) mod profiles;
pub(crate) mod questions;
pub(crate) mod quiz_submissions;
pub(crate) mod quizzes;
pub(crate) mod users;
