use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Answer, Question, Quiz, QuizSubmission};
use crate::db::types::QuestionType;
use crate::services::quiz_scoring::ScoreOutcome;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(
        length(min = 1, max = 200, message = "title must be 1-200 characters"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    #[serde(alias = "passingScore")]
    #[validate(range(min = 0, max = 100, message = "passing_score must be between 0 and 100"))]
    pub(crate) passing_score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) lesson_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) passing_score: i32,
    pub(crate) created_at: String,
}

impl QuizResponse {
    pub(crate) fn from_db(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            lesson_id: quiz.lesson_id,
            title: quiz.title,
            description: quiz.description,
            passing_score: quiz.passing_score,
            created_at: format_primitive(quiz.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[serde(alias = "questionText")]
    #[validate(
        length(min = 1, message = "question_text must not be empty"),
        custom(function = "crate::schemas::not_blank")
    )]
    pub(crate) question_text: String,
    #[serde(alias = "questionType")]
    pub(crate) question_type: QuestionType,
    #[serde(default = "default_points")]
    #[validate(range(min = 0, message = "points must be non-negative"))]
    pub(crate) points: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "order must be non-negative"))]
    pub(crate) order: Option<i32>,
    /// Multiple choice texts by slot; blank slots are skipped.
    #[serde(default)]
    pub(crate) answers: Vec<String>,
    /// Slot index of the correct answer (0 = True, 1 = False for true/false).
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: Option<usize>,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: String,
    pub(crate) answer_text: String,
    /// Only revealed to the quiz owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_correct: Option<bool>,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: Answer, reveal: bool) -> Self {
        Self {
            id: answer.id,
            answer_text: answer.answer_text,
            is_correct: reveal.then_some(answer.is_correct),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) order: i32,
    pub(crate) points: i32,
    pub(crate) answers: Vec<AnswerResponse>,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question, answers: Vec<Answer>, reveal: bool) -> Self {
        Self {
            id: question.id,
            quiz_id: question.quiz_id,
            question_text: question.question_text,
            question_type: question.question_type,
            order: question.position,
            points: question.points,
            answers: answers.into_iter().map(|answer| AnswerResponse::from_db(answer, reveal)).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizDetailResponse {
    #[serde(flatten)]
    pub(crate) quiz: QuizResponse,
    pub(crate) course_id: String,
    pub(crate) questions: Vec<QuestionResponse>,
    pub(crate) total_points: i64,
    pub(crate) is_owner: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizSubmitRequest {
    /// Question id to selected answer id.
    #[serde(default)]
    pub(crate) answers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResultResponse {
    pub(crate) quiz_id: String,
    pub(crate) score: f64,
    pub(crate) points_earned: i64,
    pub(crate) total_points: i64,
    pub(crate) pending_review_points: i64,
    pub(crate) passed: bool,
    pub(crate) passing_score: i32,
    /// False for owner previews, which are never stored.
    pub(crate) recorded: bool,
    pub(crate) submission_id: Option<String>,
    pub(crate) message: String,
}

impl SubmissionResultResponse {
    pub(crate) fn new(
        quiz: &Quiz,
        outcome: ScoreOutcome,
        submission: Option<&QuizSubmission>,
        message: String,
    ) -> Self {
        Self {
            quiz_id: quiz.id.clone(),
            score: outcome.percentage,
            points_earned: outcome.points_earned,
            total_points: outcome.total_points,
            pending_review_points: outcome.pending_review_points,
            passed: outcome.passed,
            passing_score: quiz.passing_score,
            recorded: submission.is_some(),
            submission_id: submission.map(|row| row.id.clone()),
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) student_name: Option<String>,
    pub(crate) score: f64,
    pub(crate) passed: bool,
    pub(crate) submitted_at: String,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: QuizSubmission, student_name: Option<String>) -> Self {
        Self {
            id: submission.id,
            quiz_id: submission.quiz_id,
            student_id: submission.student_id,
            student_name,
            score: submission.score,
            passed: submission.passed,
            submitted_at: format_primitive(submission.submitted_at),
        }
    }
}
