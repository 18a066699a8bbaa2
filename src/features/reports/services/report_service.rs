use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{DocumentStore, NewReport, ReportRecord};

/// Service for storing and retrieving generated reports
pub struct ReportService {
    store: Arc<dyn DocumentStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn store(&self, user_id: &str, report_html: String) -> Result<ReportRecord> {
        let report = self
            .store
            .store_report(NewReport {
                user_id: user_id.to_string(),
                report_html,
            })
            .await?;

        tracing::info!("Report stored: id={}, user_id={}", report.id, user_id);
        Ok(report)
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<ReportRecord>> {
        self.store.list_reports_by_user(user_id).await
    }

    /// Get a report owned by `user_id`
    pub async fn get_for_user(&self, user_id: &str, id: Uuid) -> Result<ReportRecord> {
        self.store
            .find_report(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryDocumentStore;

    #[tokio::test]
    async fn test_get_for_user_is_scoped() {
        let service = ReportService::new(Arc::new(MemoryDocumentStore::new()));
        let stored = service
            .store("1234", "<h1>Report</h1>".to_string())
            .await
            .unwrap();
        let id = stored.id;

        let report = service.get_for_user("1234", id).await.unwrap();
        assert_eq!(report, stored);

        assert!(matches!(
            service.get_for_user("5678", id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.list_by_user("1234").await.unwrap().len(), 1);
        assert!(service.list_by_user("5678").await.unwrap().is_empty());
    }
}
