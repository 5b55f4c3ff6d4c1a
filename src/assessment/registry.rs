//! Active checkup sessions keyed by id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::AnalysisGateway;

use super::manager::AssessmentManager;
use super::questions::Questionnaire;

/// Bounds on the session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// A session untouched for this long is dropped.
    pub idle_timeout: Duration,
    /// Starting a session beyond this drops the least recently used one.
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(3600),
            max_sessions: 10_000,
        }
    }
}

struct Entry {
    manager: Arc<AssessmentManager>,
    last_seen: Instant,
}

/// In-memory session table. Nothing is persisted; sessions end when
/// deleted, when idle past [`SessionLimits::idle_timeout`], or when pushed
/// out by the capacity limit.
pub struct SessionRegistry {
    questionnaire: Arc<Questionnaire>,
    gateway: Arc<AnalysisGateway>,
    limits: SessionLimits,
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new(questionnaire: Arc<Questionnaire>, gateway: Arc<AnalysisGateway>) -> Self {
        Self {
            questionnaire,
            gateway,
            limits: SessionLimits::default(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn questionnaire(&self) -> &Arc<Questionnaire> {
        &self.questionnaire
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Create a session at the first question.
    pub async fn start_session(&self) -> Arc<AssessmentManager> {
        self.evict_idle().await;

        let id = Uuid::new_v4();
        let manager = Arc::new(AssessmentManager::new(
            id,
            self.questionnaire.clone(),
            self.gateway.clone(),
        ));

        let mut sessions = self.sessions.write().await;
        while sessions.len() >= self.limits.max_sessions.max(1) {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            info!(session_id = %oldest, "Session table full, dropped least recently used session");
        }
        sessions.insert(
            id,
            Entry {
                manager: manager.clone(),
                last_seen: Instant::now(),
            },
        );
        info!(session_id = %id, "Checkup session started");
        manager
    }

    /// Look up a session and mark it as used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<AssessmentManager>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.manager.clone())
    }

    /// Drop a session. Returns whether it existed.
    pub async fn end_session(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Checkup session ended");
        }
        removed
    }

    /// Drop every session idle past the timeout. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let idle_timeout = self.limits.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_seen.elapsed() < idle_timeout;
            if !keep {
                debug!(session_id = %id, "Idle session evicted");
            }
            keep
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Spawn a background task that periodically evicts idle sessions.
pub fn spawn_eviction_task(
    registry: Arc<SessionRegistry>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            registry.evict_idle().await;
        }
    })
}
