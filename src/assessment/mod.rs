//! Checkup flow: questions, crisis policy, and the per-session state machine.

pub mod crisis;
pub mod manager;
pub mod questions;
pub mod registry;
pub mod routes;
pub mod session;
pub mod state;

pub use crisis::is_crisis;
pub use manager::AssessmentManager;
pub use questions::{AnswerOption, Question, QuestionKind, Questionnaire};
pub use registry::{SessionLimits, SessionRegistry, spawn_eviction_task};
pub use routes::{SessionRouteState, session_routes};
pub use session::{Advance, AssessmentSession, SessionSnapshot};
pub use state::FlowState;
