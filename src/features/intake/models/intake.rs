use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::wizard::WizardStep;
use crate::core::error::{AppError, Result};
use crate::features::files::models::UploadedFile;

/// The three damage figures collected on the compensation screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Damages {
    pub economic: Decimal,
    pub non_economic: Decimal,
    pub punitive: Decimal,
}

impl Damages {
    pub fn total(&self) -> Decimal {
        self.economic + self.non_economic + self.punitive
    }
}

/// An upload kept for extraction together with its stored id.
///
/// The payload is dropped once a report has been generated; the size is
/// kept separately so the metadata survives.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub id: Uuid,
    pub file: UploadedFile,
    pub file_size: usize,
}

impl StoredUpload {
    pub fn new(id: Uuid, file: UploadedFile) -> Self {
        let file_size = file.data.len();
        Self {
            id,
            file,
            file_size,
        }
    }

    pub fn release_payload(&mut self) {
        self.file.data = Vec::new();
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub id: Uuid,
    pub html: String,
    pub created_at: DateTime<Utc>,
}

/// Everything collected for one case, filled in step by step
#[derive(Debug, Clone, Default)]
pub struct IntakeData {
    pub user_id: String,
    pub client_name: String,
    pub incident_date: Option<NaiveDate>,
    pub contact_info: Option<String>,
    pub incident_overview: String,
    pub damages: Damages,
    pub uploads: Vec<StoredUpload>,
    pub report: Option<GeneratedReport>,
}

#[derive(Debug, Clone)]
pub struct IntakeSession {
    pub id: Uuid,
    pub step: WizardStep,
    pub data: IntakeData,
    /// Set while uploads or report generation run outside the session lock
    pub in_flight: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IntakeSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            step: WizardStep::ClientInformation,
            data: IntakeData::default(),
            in_flight: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reject a submission for any step other than the current one, or
    /// while another request is still working on this intake
    pub fn ensure_step(&self, submitted: WizardStep) -> Result<()> {
        if self.in_flight {
            return Err(AppError::Conflict(format!(
                "Intake is still processing step {} ({})",
                self.step.number(),
                self.step
            )));
        }
        if self.step.accepts(submitted) {
            return Ok(());
        }
        Err(AppError::Conflict(format!(
            "Intake is on step {} ({}); '{}' cannot be submitted now",
            self.step.number(),
            self.step,
            submitted
        )))
    }

    /// Claim `step` for a request that does its work outside the session lock
    pub fn begin(&mut self, step: WizardStep) -> Result<()> {
        self.ensure_step(step)?;
        self.in_flight = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    /// Move to the next step. Leaving report generation requires a report.
    pub fn advance(&mut self) -> Result<()> {
        if self.step == WizardStep::GenerateReport && self.data.report.is_none() {
            return Err(AppError::Conflict(
                "A report must be generated before continuing".to_string(),
            ));
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damages_total() {
        let damages = Damages {
            economic: Decimal::new(150050, 2),
            non_economic: Decimal::from(2000),
            punitive: Decimal::ZERO,
        };
        assert_eq!(damages.total(), Decimal::new(350050, 2));
        assert_eq!(Damages::default().total(), Decimal::ZERO);
    }

    #[test]
    fn test_wrong_step_is_conflict() {
        let session = IntakeSession::new();
        assert!(session.ensure_step(WizardStep::ClientInformation).is_ok());
        assert!(matches!(
            session.ensure_step(WizardStep::Compensation),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_generation_step_requires_report() {
        let mut session = IntakeSession::new();
        session.step = WizardStep::GenerateReport;

        assert!(session.advance().is_err());
        assert_eq!(session.step, WizardStep::GenerateReport);

        session.data.report = Some(GeneratedReport {
            id: Uuid::now_v7(),
            html: "<h1>Report</h1>".to_string(),
            created_at: Utc::now(),
        });
        session.advance().unwrap();
        assert_eq!(session.step, WizardStep::RetrieveReports);
    }

    #[test]
    fn test_claimed_step_rejects_second_claim() {
        let mut session = IntakeSession::new();
        session.step = WizardStep::Uploads;

        session.begin(WizardStep::Uploads).unwrap();
        assert!(matches!(
            session.begin(WizardStep::Uploads),
            Err(AppError::Conflict(_))
        ));

        session.finish();
        assert!(session.begin(WizardStep::Uploads).is_ok());
    }

    #[test]
    fn test_release_payload_keeps_metadata() {
        let mut upload = StoredUpload::new(
            Uuid::now_v7(),
            UploadedFile {
                name: "scene.png".to_string(),
                content_type: "image/png".to_string(),
                data: vec![0; 2048],
            },
        );

        upload.release_payload();

        assert!(upload.file.data.is_empty());
        assert_eq!(upload.file_size, 2048);
        assert_eq!(upload.file.name, "scene.png");
    }

    #[test]
    fn test_terminal_step_stays_put() {
        let mut session = IntakeSession::new();
        session.step = WizardStep::ReportsRetrieved;
        session.advance().unwrap();
        assert_eq!(session.step, WizardStep::ReportsRetrieved);
    }
}
