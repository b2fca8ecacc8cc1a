pub(crate) mod auth;
pub(crate) mod courses;
pub(crate) mod dashboard;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod lessons;
pub(crate) mod modules;
pub(crate) mod quizzes;
pub(crate) mod router;
pub(crate) mod users;
pub(crate) mod validation;
