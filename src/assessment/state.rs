//! Flow state of a checkup session.

use serde::{Deserialize, Serialize};

/// Where a session is in the checkup.
///
/// InProgress ⇄ CrisisInterrupt, then InProgress → Analyzing → Completed.
/// Restart returns any state to InProgress and is not modelled as a
/// transition here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    InProgress,
    CrisisInterrupt,
    Analyzing,
    Completed,
}

impl FlowState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (self, target),
            (InProgress, CrisisInterrupt)
                | (CrisisInterrupt, InProgress)
                | (InProgress, Analyzing)
                | (Analyzing, Completed)
        )
    }

    /// Whether answers may be recorded in this state.
    ///
    /// A crisis answer can be replaced while the interrupt is showing.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::InProgress | Self::CrisisInterrupt)
    }
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InProgress => "in_progress",
            Self::CrisisInterrupt => "crisis_interrupt",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}
