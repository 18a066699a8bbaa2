use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::FileKind;
use crate::features::intake::models::{Damages, IntakeSession, WizardStep};

/// Step 1: client identity
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClientInformationDto {
    /// Identifier every stored file and report is tagged with
    #[validate(custom(
        function = "crate::shared::validation::not_blank",
        message = "user_id is required"
    ))]
    pub user_id: String,

    #[validate(custom(
        function = "crate::shared::validation::not_blank",
        message = "client_name is required"
    ))]
    pub client_name: String,

    #[validate(required(message = "incident_date is required"))]
    pub incident_date: Option<NaiveDate>,

    pub contact_info: Option<String>,
}

/// Step 2: what happened
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IncidentOverviewDto {
    #[validate(custom(
        function = "crate::shared::validation::not_blank",
        message = "incident_overview is required"
    ))]
    pub incident_overview: String,
}

/// Step 3: estimated damages; absent figures count as zero
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CompensationDto {
    #[validate(custom(
        function = "crate::shared::validation::non_negative",
        message = "economic_damages must not be negative"
    ))]
    #[schema(value_type = Option<f64>, example = 1500.0)]
    pub economic_damages: Option<Decimal>,

    #[validate(custom(
        function = "crate::shared::validation::non_negative",
        message = "non_economic_damages must not be negative"
    ))]
    #[schema(value_type = Option<f64>, example = 5000.0)]
    pub non_economic_damages: Option<Decimal>,

    #[validate(custom(
        function = "crate::shared::validation::non_negative",
        message = "punitive_damages must not be negative"
    ))]
    #[schema(value_type = Option<f64>, example = 0.0)]
    pub punitive_damages: Option<Decimal>,
}

impl CompensationDto {
    pub fn damages(&self) -> Damages {
        Damages {
            economic: self.economic_damages.unwrap_or_default(),
            non_economic: self.non_economic_damages.unwrap_or_default(),
            punitive: self.punitive_damages.unwrap_or_default(),
        }
    }
}

/// Multipart field an upload arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    Documents,
    Photos,
}

impl UploadField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "documents" => Some(UploadField::Documents),
            "photos" => Some(UploadField::Photos),
            _ => None,
        }
    }

    pub fn accepts(&self, kind: FileKind) -> bool {
        match self {
            UploadField::Documents => matches!(kind, FileKind::Pdf | FileKind::Docx),
            UploadField::Photos => kind == FileKind::Image,
        }
    }

    pub fn allowed_extensions(&self) -> &'static str {
        match self {
            UploadField::Documents => "pdf, docx",
            UploadField::Photos => "jpg, jpeg, png",
        }
    }
}

/// Step 6: whose reports to list; defaults to the intake's user id
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RetrieveReportsDto {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DamagesDto {
    #[schema(value_type = String, example = "1500.00")]
    pub economic: Decimal,
    #[schema(value_type = String, example = "5000.00")]
    pub non_economic: Decimal,
    #[schema(value_type = String, example = "0")]
    pub punitive: Decimal,
    #[schema(value_type = String, example = "6500.00")]
    pub total: Decimal,
}

impl From<Damages> for DamagesDto {
    fn from(d: Damages) -> Self {
        Self {
            economic: d.economic,
            non_economic: d.non_economic,
            punitive: d.punitive,
            total: d.total(),
        }
    }
}

/// An upload as stored in the document store
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredUploadDto {
    pub id: Uuid,
    pub filename: String,
    pub filetype: String,
    pub file_size: usize,
}

/// Current state of an intake, used to resume the form
#[derive(Debug, Serialize, ToSchema)]
pub struct IntakeSessionDto {
    pub id: Uuid,
    pub step: WizardStep,
    /// 1-based screen number
    pub step_number: u8,
    pub user_id: String,
    pub client_name: String,
    pub incident_date: Option<NaiveDate>,
    pub contact_info: Option<String>,
    pub incident_overview: String,
    pub damages: DamagesDto,
    pub uploads: Vec<StoredUploadDto>,
    pub report_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&IntakeSession> for IntakeSessionDto {
    fn from(s: &IntakeSession) -> Self {
        Self {
            id: s.id,
            step: s.step,
            step_number: s.step.number(),
            user_id: s.data.user_id.clone(),
            client_name: s.data.client_name.clone(),
            incident_date: s.data.incident_date,
            contact_info: s.data.contact_info.clone(),
            incident_overview: s.data.incident_overview.clone(),
            damages: s.data.damages.into(),
            uploads: s
                .data
                .uploads
                .iter()
                .map(|u| StoredUploadDto {
                    id: u.id,
                    filename: u.file.name.clone(),
                    filetype: u.file.content_type.clone(),
                    file_size: u.file_size,
                })
                .collect(),
            report_id: s.data.report.as_ref().map(|r| r.id),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Outcome of report generation
#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedReportDto {
    pub report_id: Uuid,
    pub report_html: String,
    pub created_at: DateTime<Utc>,
    /// e.g. "No relevant medical literature results found"
    pub notices: Vec<String>,
    pub view_url: String,
    pub download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_information_requires_name_and_date() {
        let dto = ClientInformationDto {
            user_id: "1234".to_string(),
            client_name: "   ".to_string(),
            incident_date: None,
            contact_info: None,
        };
        let err = dto.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("client_name"));
        assert!(fields.contains_key("incident_date"));
        assert!(!fields.contains_key("user_id"));
    }

    #[test]
    fn test_compensation_defaults_and_rejects_negative() {
        let dto: CompensationDto =
            serde_json::from_str(r#"{"economic_damages": 1500.5}"#).unwrap();
        assert!(dto.validate().is_ok());
        let damages = dto.damages();
        assert_eq!(damages.economic, Decimal::new(15005, 1));
        assert_eq!(damages.non_economic, Decimal::ZERO);
        assert_eq!(damages.total(), Decimal::new(15005, 1));

        let dto: CompensationDto =
            serde_json::from_str(r#"{"punitive_damages": "-10"}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_upload_field_kinds() {
        assert!(UploadField::Documents.accepts(FileKind::Pdf));
        assert!(UploadField::Documents.accepts(FileKind::Docx));
        assert!(!UploadField::Documents.accepts(FileKind::Image));
        assert!(UploadField::Photos.accepts(FileKind::Image));
        assert_eq!(UploadField::from_name("receipts"), None);
    }
}
