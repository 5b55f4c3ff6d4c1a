//! Questionnaire definitions.
//!
//! Questions are built once at startup and never mutated afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Scale,
    Safety,
}

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// Unique within its question.
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    /// Only meaningful on safety questions.
    #[serde(default)]
    pub is_crisis: bool,
}

impl AnswerOption {
    pub fn scale(value: i32, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            weight: Some(value),
            is_crisis: false,
        }
    }

    pub fn safety(value: &str, label: &str, is_crisis: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            weight: None,
            is_crisis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// An ordered, validated list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    /// Validate and wrap a question list: non-empty, unique question ids,
    /// unique option values within each question.
    pub fn new(questions: Vec<Question>) -> Result<Self, ValidationError> {
        if questions.is_empty() {
            return Err(ValidationError::EmptyQuestionnaire);
        }

        let mut ids = HashSet::new();
        for question in &questions {
            if !ids.insert(question.id.as_str()) {
                return Err(ValidationError::DuplicateQuestion(question.id.clone()));
            }
            let mut values = HashSet::new();
            for option in &question.options {
                if !values.insert(option.value.as_str()) {
                    return Err(ValidationError::DuplicateOption {
                        question: question.id.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }

        Ok(Self { questions })
    }

    /// The built-in seven-question wellness checkup.
    pub fn default_checkup() -> Self {
        let scale = |id: &str, text: &str, labels: [&str; 5], ascending: bool| {
            let options = labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let weight = if ascending { i as i32 + 1 } else { 5 - i as i32 };
                    AnswerOption::scale(weight, label)
                })
                .collect();
            Question {
                id: id.to_string(),
                text: text.to_string(),
                kind: QuestionKind::Scale,
                options,
            }
        };

        let questions = vec![
            scale(
                "mood",
                "How would you describe your overall mood today?",
                ["Excellent", "Good", "Neutral", "Poor", "Very Poor"],
                false,
            ),
            scale(
                "anxiety",
                "How anxious or worried have you felt recently?",
                ["Not at all", "Slightly", "Moderately", "Very", "Extremely"],
                true,
            ),
            scale(
                "sleep",
                "How would you rate your sleep quality lately?",
                ["Excellent", "Good", "Fair", "Poor", "Very Poor"],
                false,
            ),
            scale(
                "energy",
                "How are your energy levels today?",
                ["High energy", "Good energy", "Average energy", "Low energy", "No energy"],
                false,
            ),
            scale(
                "social",
                "How connected do you feel to friends and family?",
                ["Very connected", "Connected", "Somewhat connected", "Disconnected", "Very isolated"],
                false,
            ),
            scale(
                "stress",
                "How well are you managing stress?",
                ["Very well", "Well", "Okay", "Struggling", "Overwhelmed"],
                false,
            ),
            Question {
                id: "safety".to_string(),
                text: "Have you had thoughts of hurting yourself or others in the past week?"
                    .to_string(),
                kind: QuestionKind::Safety,
                options: vec![
                    AnswerOption::safety("no", "No, not at all", false),
                    AnswerOption::safety("mild", "Briefly, but I don't plan to act on them", false),
                    AnswerOption::safety("moderate", "Yes, and I'm concerned about these thoughts", true),
                    AnswerOption::safety("severe", "Yes, and I have a plan or intent", true),
                ],
            },
        ];

        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}
