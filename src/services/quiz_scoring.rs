use std::collections::{HashMap, HashSet};

use crate::db::models::{Answer, Question};
use crate::db::types::QuestionType;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreOutcome {
    pub(crate) points_earned: i64,
    pub(crate) total_points: i64,
    /// Points carried by questions that are never auto-graded.
    pub(crate) pending_review_points: i64,
    pub(crate) percentage: f64,
    pub(crate) passed: bool,
}

/// Scores one attempt against the quiz definition.
///
/// `selected` maps question id to the chosen answer id. Questions without a
/// selection, selections naming an answer of another question and unknown
/// answer ids all contribute zero.
pub(crate) fn score_attempt(
    questions: &[Question],
    answers: &[Answer],
    selected: &HashMap<String, String>,
    passing_score: i32,
) -> ScoreOutcome {
    let correct: HashSet<(&str, &str)> = answers
        .iter()
        .filter(|answer| answer.is_correct)
        .map(|answer| (answer.question_id.as_str(), answer.id.as_str()))
        .collect();

    let mut total_points = 0_i64;
    let mut points_earned = 0_i64;
    let mut pending_review_points = 0_i64;

    for question in questions {
        let points = i64::from(question.points);
        total_points += points;

        match question.question_type {
            QuestionType::MultipleChoice | QuestionType::TrueFalse => {
                let Some(answer_id) = selected.get(&question.id) else {
                    continue;
                };
                if correct.contains(&(question.id.as_str(), answer_id.as_str())) {
                    points_earned += points;
                }
            }
            QuestionType::ShortAnswer => pending_review_points += points,
        }
    }

    let score = percentage(points_earned, total_points);

    ScoreOutcome {
        points_earned,
        total_points,
        pending_review_points,
        percentage: score,
        passed: is_passing(score, passing_score),
    }
}

/// A quiz worth zero points always yields 0%.
pub(crate) fn percentage(points_earned: i64, total_points: i64) -> f64 {
    if total_points == 0 {
        return 0.0;
    }
    points_earned as f64 / total_points as f64 * 100.0
}

pub(crate) fn is_passing(percentage: f64, passing_score: i32) -> bool {
    percentage >= f64::from(passing_score)
}

pub(crate) fn result_message(outcome: &ScoreOutcome, passing_score: i32) -> String {
    if outcome.passed {
        format!("Congratulations! You passed with {:.1}%.", outcome.percentage)
    } else {
        format!(
            "You scored {:.1}%. A score of {passing_score}% is required to pass.",
            outcome.percentage
        )
    }
}
