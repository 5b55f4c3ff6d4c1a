//! The checkup state machine.
//!
//! `AssessmentSession` is synchronous and does no I/O. Completing the last
//! question is split into two steps, [`AssessmentSession::advance`] handing
//! back the answers and [`AssessmentSession::complete_analysis`] storing the
//! result, so the caller can run the analysis in between.
//!
//! Every rejected operation returns a [`ValidationError`] and leaves the
//! session untouched.

use std::sync::Arc;

use serde::Serialize;

use crate::analysis::{AnswerSet, WellnessAnalysis};
use crate::error::ValidationError;

use super::crisis;
use super::questions::{Question, QuestionKind, Questionnaire};
use super::state::FlowState;

/// Outcome of a successful [`AssessmentSession::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved to the next question.
    Moved,
    /// The last question was answered; the session is now `Analyzing` and
    /// the full answer set must be analyzed.
    ReadyForAnalysis(AnswerSet),
}

/// What a collaborator sees after every operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub index: usize,
    pub question_count: usize,
    pub question_id: String,
    pub flow_state: FlowState,
    pub answers: AnswerSet,
    pub analysis: Option<WellnessAnalysis>,
    /// Percentage of questions answered up to and including the current one.
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSession {
    questionnaire: Arc<Questionnaire>,
    index: usize,
    answers: AnswerSet,
    state: FlowState,
    analysis: Option<WellnessAnalysis>,
}

impl AssessmentSession {
    pub fn new(questionnaire: Arc<Questionnaire>) -> Self {
        Self {
            questionnaire,
            index: 0,
            answers: AnswerSet::new(),
            state: FlowState::InProgress,
            analysis: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn analysis(&self) -> Option<&WellnessAnalysis> {
        self.analysis.as_ref()
    }

    pub fn current_question(&self) -> &Question {
        // index is kept within [0, len) and the questionnaire is never empty
        &self.questionnaire.questions()[self.index]
    }

    fn is_last(&self) -> bool {
        self.index + 1 == self.questionnaire.len()
    }

    fn current_answered(&self) -> bool {
        self.answers.contains_key(&self.current_question().id)
    }

    fn reject(&self, action: &str) -> ValidationError {
        ValidationError::InvalidTransition {
            state: self.state.to_string(),
            action: action.to_string(),
        }
    }

    /// Record (or overwrite) the answer to the current question.
    ///
    /// A crisis-flagged safety answer moves the session into
    /// `CrisisInterrupt`. Resubmitting a non-crisis answer while
    /// interrupted resumes `InProgress`. The index never moves.
    pub fn record_answer(&mut self, question_id: &str, value: &str) -> Result<FlowState, ValidationError> {
        if !self.state.accepts_answers() {
            return Err(self.reject("record an answer"));
        }

        let question = self.current_question();
        if question.id != question_id {
            return Err(ValidationError::QuestionMismatch {
                expected: question.id.clone(),
                got: question_id.to_string(),
            });
        }
        if question.option(value).is_none() {
            return Err(ValidationError::UnknownOption {
                question: question.id.clone(),
                value: value.to_string(),
            });
        }

        let next_state = if question.kind == QuestionKind::Safety {
            if crisis::is_crisis(question, value) {
                FlowState::CrisisInterrupt
            } else {
                FlowState::InProgress
            }
        } else {
            self.state
        };

        self.answers.insert(question_id.to_string(), value.to_string());
        self.state = next_state;
        Ok(next_state)
    }

    /// Acknowledge a crisis interrupt. The crisis answer stays recorded.
    pub fn dismiss_crisis_interrupt(&mut self) -> Result<(), ValidationError> {
        if !self.state.can_transition_to(FlowState::InProgress) {
            return Err(self.reject("dismiss the crisis interrupt"));
        }
        self.state = FlowState::InProgress;
        Ok(())
    }

    /// Move past the current, answered question.
    pub fn advance(&mut self) -> Result<Advance, ValidationError> {
        if self.state != FlowState::InProgress {
            return Err(self.reject("advance"));
        }
        if !self.current_answered() {
            return Err(ValidationError::Unanswered {
                question: self.current_question().id.clone(),
            });
        }

        if self.is_last() {
            self.state = FlowState::Analyzing;
            Ok(Advance::ReadyForAnalysis(self.answers.clone()))
        } else {
            self.index += 1;
            Ok(Advance::Moved)
        }
    }

    /// Store the analysis for an `Analyzing` session and complete it.
    pub fn complete_analysis(&mut self, analysis: WellnessAnalysis) -> Result<(), ValidationError> {
        if !self.state.can_transition_to(FlowState::Completed) {
            return Err(self.reject("complete analysis"));
        }
        self.analysis = Some(analysis);
        self.state = FlowState::Completed;
        Ok(())
    }

    /// Step back one question, keeping every recorded answer.
    pub fn retreat(&mut self) -> Result<(), ValidationError> {
        if self.state != FlowState::InProgress {
            return Err(self.reject("go back"));
        }
        if self.index == 0 {
            return Err(ValidationError::AtFirstQuestion);
        }
        self.index -= 1;
        Ok(())
    }

    /// Discard everything and start over. Always succeeds.
    pub fn restart(&mut self) {
        self.index = 0;
        self.answers.clear();
        self.state = FlowState::InProgress;
        self.analysis = None;
    }

    pub fn progress(&self) -> u8 {
        let done = self.index + usize::from(self.current_answered());
        let pct = (done * 100) as f64 / self.questionnaire.len() as f64;
        pct.round().clamp(0.0, 100.0) as u8
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            index: self.index,
            question_count: self.questionnaire.len(),
            question_id: self.current_question().id.clone(),
            flow_state: self.state,
            answers: self.answers.clone(),
            analysis: self.analysis.clone(),
            progress: self.progress(),
        }
    }
}
