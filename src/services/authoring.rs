use thiserror::Error;

use crate::db::types::{LessonContentType, QuestionType};
use crate::repositories::questions::NewAnswer;

pub(crate) const MAX_CHOICE_ANSWERS: usize = 4;
pub(crate) const MAX_ANSWER_LENGTH: usize = 500;

const TRUE_FALSE_LABELS: [&str; 2] = ["True", "False"];

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum AuthoringError {
    #[error("at most {MAX_CHOICE_ANSWERS} answers may be supplied")]
    TooManyAnswers,
    #[error("answers[{0}] must be at most {MAX_ANSWER_LENGTH} characters")]
    AnswerTooLong(usize),
    #[error("correct_answer is required for {0} questions")]
    MissingCorrectAnswer(&'static str),
    #[error("correct_answer must point to a non-blank answer")]
    CorrectAnswerBlank,
    #[error("correct_answer must be 0 (True) or 1 (False)")]
    InvalidTrueFalseAnswer,
    #[error("{0} questions do not take answers")]
    UnexpectedAnswers(&'static str),
    #[error("{field} is required for {kind} lessons")]
    MissingPayload { kind: &'static str, field: &'static str },
    #[error("{field} is not allowed for {kind} lessons")]
    UnexpectedPayload { kind: &'static str, field: &'static str },
}

/// Turns the authoring form into the answer rows to persist.
///
/// Multiple choice keeps only the non-blank texts; `correct_index` addresses
/// the submitted slots, blanks included. True/false generates its two fixed
/// answers. Short answer questions carry none.
pub(crate) fn build_answers(
    question_type: QuestionType,
    texts: &[String],
    correct_index: Option<usize>,
) -> Result<Vec<NewAnswer>, AuthoringError> {
    match question_type {
        QuestionType::MultipleChoice => {
            if texts.len() > MAX_CHOICE_ANSWERS {
                return Err(AuthoringError::TooManyAnswers);
            }
            if let Some(index) =
                texts.iter().position(|text| text.trim().chars().count() > MAX_ANSWER_LENGTH)
            {
                return Err(AuthoringError::AnswerTooLong(index));
            }
            let correct_index =
                correct_index.ok_or(AuthoringError::MissingCorrectAnswer("multiple_choice"))?;
            let correct_is_filled = texts
                .get(correct_index)
                .is_some_and(|text| !text.trim().is_empty());
            if !correct_is_filled {
                return Err(AuthoringError::CorrectAnswerBlank);
            }

            Ok(texts
                .iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(index, text)| NewAnswer {
                    answer_text: text.trim().to_string(),
                    is_correct: index == correct_index,
                })
                .collect())
        }
        QuestionType::TrueFalse => {
            let correct_index =
                correct_index.ok_or(AuthoringError::MissingCorrectAnswer("true_false"))?;
            if correct_index >= TRUE_FALSE_LABELS.len() {
                return Err(AuthoringError::InvalidTrueFalseAnswer);
            }

            Ok(TRUE_FALSE_LABELS
                .iter()
                .enumerate()
                .map(|(index, label)| NewAnswer {
                    answer_text: (*label).to_string(),
                    is_correct: index == correct_index,
                })
                .collect())
        }
        QuestionType::ShortAnswer => {
            if texts.iter().any(|text| !text.trim().is_empty()) {
                return Err(AuthoringError::UnexpectedAnswers("short_answer"));
            }
            Ok(Vec::new())
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct LessonPayload {
    pub(crate) text_content: String,
    pub(crate) video_url: String,
    pub(crate) pdf_file: Option<String>,
}

/// Checks that a lesson carries exactly the payload its kind requires.
pub(crate) fn normalize_lesson_payload(
    content_type: LessonContentType,
    text_content: Option<&str>,
    video_url: Option<&str>,
    pdf_file: Option<&str>,
) -> Result<LessonPayload, AuthoringError> {
    let text_content = non_blank(text_content);
    let video_url = non_blank(video_url);
    let pdf_file = non_blank(pdf_file);

    let (kind, required) = match content_type {
        LessonContentType::Video => ("video", Some("video_url")),
        LessonContentType::Pdf => ("pdf", Some("pdf_file")),
        LessonContentType::Text => ("text", Some("text_content")),
        LessonContentType::Quiz => ("quiz", None),
    };

    let supplied = [
        ("text_content", text_content.is_some()),
        ("video_url", video_url.is_some()),
        ("pdf_file", pdf_file.is_some()),
    ];
    for (field, present) in supplied {
        if Some(field) == required {
            if !present {
                return Err(AuthoringError::MissingPayload { kind, field });
            }
        } else if present {
            return Err(AuthoringError::UnexpectedPayload { kind, field });
        }
    }

    Ok(LessonPayload {
        text_content: text_content.unwrap_or_default(),
        video_url: video_url.unwrap_or_default(),
        pdf_file,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
