//! AssessmentManager — one user's checkup, serialized behind a mutex and
//! wired to the analysis gateway.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisGateway, WellnessAnalysis, fallback};
use crate::error::ValidationError;

use super::questions::Questionnaire;
use super::session::{Advance, AssessmentSession, SessionSnapshot};
use super::state::FlowState;

/// Owns one [`AssessmentSession`].
///
/// Operations take the session lock one at a time. The wellness analysis
/// started by advancing past the last question runs on its own task with
/// the lock released: snapshots taken meanwhile report `analyzing`, a second
/// advance is rejected, and the session still reaches `completed` if the
/// caller that started it goes away.
pub struct AssessmentManager {
    id: Uuid,
    gateway: Arc<AnalysisGateway>,
    session: Arc<Mutex<AssessmentSession>>,
    /// Bumped on every restart; an analysis started under an older value
    /// is discarded.
    epoch: Arc<AtomicU64>,
}

impl AssessmentManager {
    pub fn new(id: Uuid, questionnaire: Arc<Questionnaire>, gateway: Arc<AnalysisGateway>) -> Self {
        Self {
            id,
            gateway,
            session: Arc::new(Mutex::new(AssessmentSession::new(questionnaire))),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn record_answer(
        &self,
        question_id: &str,
        value: &str,
    ) -> Result<SessionSnapshot, ValidationError> {
        let mut session = self.session.lock().await;
        let before = session.state();
        let after = session.record_answer(question_id, value)?;

        match (before, after) {
            (_, FlowState::CrisisInterrupt) => {
                info!(session_id = %self.id, question = question_id, "Crisis interrupt raised")
            }
            (FlowState::CrisisInterrupt, FlowState::InProgress) => {
                info!(session_id = %self.id, "Crisis answer replaced, resuming")
            }
            _ => debug!(session_id = %self.id, question = question_id, "Answer recorded"),
        }
        Ok(session.snapshot())
    }

    pub async fn dismiss_crisis_interrupt(&self) -> Result<SessionSnapshot, ValidationError> {
        let mut session = self.session.lock().await;
        session.dismiss_crisis_interrupt()?;
        info!(session_id = %self.id, "Crisis interrupt dismissed");
        Ok(session.snapshot())
    }

    /// Move on from the current question. Past the last question this runs
    /// the wellness analysis and returns the completed snapshot.
    pub async fn advance(&self) -> Result<SessionSnapshot, ValidationError> {
        let mut session = self.session.lock().await;

        let answers = match session.advance()? {
            Advance::Moved => {
                debug!(session_id = %self.id, index = session.index(), "Advanced");
                return Ok(session.snapshot());
            }
            Advance::ReadyForAnalysis(answers) => answers,
        };
        let started = self.epoch.load(Ordering::SeqCst);
        drop(session);

        info!(session_id = %self.id, answers = answers.len(), "Analyzing checkup");
        let task = tokio::spawn({
            let id = self.id;
            let gateway = self.gateway.clone();
            let session = self.session.clone();
            let epoch = self.epoch.clone();
            async move {
                let analysis = gateway.analyze_wellness(&answers).await;
                finish_analysis(id, &session, &epoch, started, analysis).await
            }
        });

        match task.await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Analysis task failed, using fallback");
                let analysis = fallback::wellness().clone();
                Ok(finish_analysis(self.id, &self.session, &self.epoch, started, analysis).await)
            }
        }
    }

    pub async fn retreat(&self) -> Result<SessionSnapshot, ValidationError> {
        let mut session = self.session.lock().await;
        session.retreat()?;
        debug!(session_id = %self.id, index = session.index(), "Went back");
        Ok(session.snapshot())
    }

    pub async fn restart(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        session.restart();
        info!(session_id = %self.id, "Checkup restarted");
        session.snapshot()
    }
}

/// Store `analysis` unless the session was restarted since it began.
async fn finish_analysis(
    id: Uuid,
    session: &Mutex<AssessmentSession>,
    epoch: &AtomicU64,
    started: u64,
    analysis: WellnessAnalysis,
) -> SessionSnapshot {
    let mut session = session.lock().await;
    if epoch.load(Ordering::SeqCst) != started {
        debug!(session_id = %id, "Session restarted during analysis, result discarded");
        return session.snapshot();
    }

    let score = analysis.overall_score;
    let category = analysis.category;
    match session.complete_analysis(analysis) {
        Ok(()) => info!(session_id = %id, score, category = ?category, "Checkup completed"),
        Err(e) => warn!(session_id = %id, error = %e, "Analysis result not applied"),
    }
    session.snapshot()
}
