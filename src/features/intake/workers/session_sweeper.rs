use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::features::intake::services::IntakeService;

/// Background worker that drops idle intake sessions
pub struct SessionSweeper {
    intake_service: Arc<IntakeService>,
    ttl: Duration,
    every: Duration,
}

impl SessionSweeper {
    pub fn new(intake_service: Arc<IntakeService>, ttl: Duration, every: Duration) -> Self {
        Self {
            intake_service,
            ttl,
            every,
        }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        tracing::info!(
            ttl_secs = self.ttl.as_secs(),
            "Starting intake session sweeper"
        );

        let mut interval = interval(self.every);

        loop {
            interval.tick().await;
            self.sweep().await;
        }
    }

    async fn sweep(&self) -> usize {
        self.intake_service.evict_idle_sessions(self.ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryDocumentStore;
    use crate::shared::test_helpers::intake_service;

    #[tokio::test]
    async fn test_sweep_uses_configured_ttl() {
        let scratch = tempfile::tempdir().unwrap();
        let service = Arc::new(intake_service(
            "http://127.0.0.1:9",
            scratch.path(),
            Arc::new(MemoryDocumentStore::new()),
        ));
        let id = service.create_session().await.id;

        let lenient = SessionSweeper::new(
            Arc::clone(&service),
            Duration::from_secs(3600),
            Duration::from_secs(60),
        );
        assert_eq!(lenient.sweep().await, 0);

        let strict = SessionSweeper::new(Arc::clone(&service), Duration::ZERO, Duration::from_secs(60));
        assert_eq!(strict.sweep().await, 1);
        assert!(service.get_session(id).await.is_err());
    }
}
