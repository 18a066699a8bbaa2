use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::modules::storage::ReportRecord;

/// A stored report with a link to download it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    /// Generated report body (HTML)
    pub report_html: String,
    /// Relative URL that serves the report as `report_{id}.html`
    pub download_url: String,
}

impl From<ReportRecord> for ReportResponseDto {
    fn from(r: ReportRecord) -> Self {
        let download_url = format!(
            "/api/reports/{}/download?user_id={}",
            r.id,
            urlencoding::encode(&r.user_id)
        );
        Self {
            id: r.id,
            user_id: r.user_id,
            created_at: r.created_at,
            report_html: r.report_html,
            download_url,
        }
    }
}

/// Query scoping report lookups to one user
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct ReportOwnerQuery {
    /// User identifier the reports were generated for
    #[validate(custom(
        function = "crate::shared::validation::not_blank",
        message = "user_id is required"
    ))]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_encodes_user_id() {
        let id = Uuid::now_v7();
        let dto = ReportResponseDto::from(ReportRecord {
            id,
            user_id: "case 12/a".to_string(),
            report_html: "<p/>".to_string(),
            created_at: Utc::now(),
        });

        assert_eq!(
            dto.download_url,
            format!("/api/reports/{}/download?user_id=case%2012%2Fa", id)
        );
    }
}
