//! Crisis policy: does a safety answer call for an interrupt?

use super::questions::{Question, QuestionKind};

/// True iff `question` is a safety question and the option with `value`
/// carries the crisis flag.
///
/// An unknown value is simply non-crisis; membership is checked by the
/// session before this is consulted.
pub fn is_crisis(question: &Question, value: &str) -> bool {
    question.kind == QuestionKind::Safety
        && question.option(value).is_some_and(|option| option.is_crisis)
}
