use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::intake::models::{IntakeSession, WizardStep};

/// In-process intake sessions keyed by session id
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, IntakeSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> IntakeSession {
        let session = IntakeSession::new();
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> Result<IntakeSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Apply `f` to a session under the write lock; `f` must not await.
    ///
    /// Changes made by `f` are kept only when it returns `Ok`.
    pub async fn update<T, F>(&self, id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut IntakeSession) -> Result<T>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;

        let mut draft = session.clone();
        let value = f(&mut draft)?;
        *session = draft;
        Ok(value)
    }

    /// Mark `step` as in flight and return a snapshot taken under the same lock.
    ///
    /// A second claim, or any submission, fails with a conflict until the
    /// claim is finished or released.
    pub async fn claim(self: &Arc<Self>, id: Uuid, step: WizardStep) -> Result<StepClaim> {
        let snapshot = self
            .update(id, |session| {
                session.begin(step)?;
                Ok(session.clone())
            })
            .await?;

        Ok(StepClaim {
            sessions: Arc::clone(self),
            id: Some(id),
            snapshot,
        })
    }

    async fn release(&self, id: Uuid) {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.finish();
        }
    }

    /// Drop sessions idle for longer than `ttl`; in-flight sessions are kept
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36500));
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.in_flight || now.signed_duration_since(s.updated_at) < ttl);
        before - sessions.len()
    }
}

/// An in-flight claim on one session step.
///
/// Dropping the claim without `complete` or `release` (a cancelled request)
/// clears the marker from a background task.
pub struct StepClaim {
    sessions: Arc<SessionStore>,
    id: Option<Uuid>,
    snapshot: IntakeSession,
}

impl StepClaim {
    pub fn session(&self) -> &IntakeSession {
        &self.snapshot
    }

    /// Apply the step's outcome and clear the marker in one update
    pub async fn complete<T, F>(mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut IntakeSession) -> Result<T>,
    {
        let id = self.snapshot.id;
        let result = self
            .sessions
            .update(id, |session| {
                session.finish();
                f(session)
            })
            .await;

        if result.is_ok() {
            self.id = None;
        }
        result
    }

    pub async fn release(mut self) {
        if let Some(id) = self.id.take() {
            self.sessions.release(id).await;
        }
    }
}

impl Drop for StepClaim {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let sessions = Arc::clone(&self.sessions);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { sessions.release(id).await });
            }
            Err(_) => tracing::warn!(intake_id = %id, "Intake claim dropped outside the runtime"),
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Intake session {} not found", id))
}
