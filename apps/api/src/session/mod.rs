//! Per-user working state: inputs, settings and the latest results.
//!
//! Sessions live only in memory. The store hands out clones; handlers never
//! hold the lock across a model call. A session that has not been touched for
//! the store's idle TTL is evicted.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::llm_client::PreferredModel;
use crate::models::analysis::AnalysisRecord;
use crate::models::resume::ResumeRecord;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub credential: Option<String>,
    pub model: PreferredModel,
    pub resume_text: String,
    pub job_description: String,
    pub analysis: Option<AnalysisRecord>,
    pub resume: Option<ResumeRecord>,
    last_used: Instant,
}

impl Session {
    pub fn new(credential: Option<String>, model: PreferredModel) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            credential,
            model,
            resume_text: String::new(),
            job_description: String::new(),
            analysis: None,
            resume: None,
            last_used: Instant::now(),
        }
    }

    /// Clears inputs and results. Credential and model choice are kept.
    pub fn reset(&mut self) {
        self.resume_text.clear();
        self.job_description.clear();
        self.clear_results();
    }

    pub fn set_resume_text(&mut self, text: String) {
        if self.resume_text != text {
            self.resume_text = text;
            self.clear_results();
        }
    }

    pub fn set_job_description(&mut self, text: String) {
        if self.job_description != text {
            self.job_description = text;
            self.clear_results();
        }
    }

    /// True when both inputs are present, the precondition for analysis and
    /// enhancement.
    pub fn has_inputs(&self) -> bool {
        !self.resume_text.trim().is_empty() && !self.job_description.trim().is_empty()
    }

    fn clear_results(&mut self) {
        self.analysis = None;
        self.resume = None;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            created_at: self.created_at,
            model: self.model,
            has_credential: self.credential.is_some(),
            resume_text: self.resume_text.clone(),
            job_description: self.job_description.clone(),
            analysis: self.analysis.clone(),
            resume: self.resume.clone(),
        }
    }
}

/// What clients see of a session. The credential is never echoed back.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub model: PreferredModel,
    pub has_credential: bool,
    pub resume_text: String,
    pub job_description: String,
    pub analysis: Option<AnalysisRecord>,
    pub resume: Option<ResumeRecord>,
}

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: Instant) -> bool {
        now.duration_since(session.last_used) >= self.idle_ttl
    }

    pub async fn create(&self, credential: Option<String>, model: PreferredModel) -> Session {
        let session = Session::new(credential, model);
        let mut sessions = self.inner.write().await;
        let now = Instant::now();
        sessions.retain(|_, s| !self.is_expired(s, now));
        sessions.insert(session.id, session.clone());
        session
    }

    /// Returns a copy of the session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.update(id, |s| s.clone()).await
    }

    /// Applies `f` to the session under the write lock. `None` if it does not
    /// exist or has expired.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.inner.write().await;
        let now = Instant::now();
        if sessions.get(&id).is_some_and(|s| self.is_expired(s, now)) {
            sessions.remove(&id);
            info!(session_id = %id, "Session expired");
            return None;
        }
        let session = sessions.get_mut(&id)?;
        session.last_used = now;
        Some(f(session))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    /// Number of live (unexpired) sessions.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .read()
            .await
            .values()
            .filter(|s| !self.is_expired(s, now))
            .count()
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, s| !self.is_expired(s, now));
        before - sessions.len()
    }

    /// Purges expired sessions every `period` for the life of the process.
    pub fn spawn_expiry_task(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    info!(purged, "Expired sessions purged");
                }
            }
        })
    }
}
