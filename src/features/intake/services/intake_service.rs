use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use super::session_store::SessionStore;
use crate::core::error::{AppError, Result};
use crate::features::files::models::UploadedFile;
use crate::features::files::services::{ExtractionService, FileService};
use crate::features::intake::dtos::{
    ClientInformationDto, CompensationDto, GeneratedReportDto, IncidentOverviewDto,
    StoredUploadDto,
};
use crate::features::intake::models::{
    GeneratedReport, IntakeData, IntakeSession, StoredUpload, WizardStep,
};
use crate::features::reports::models::{ClientContext, DamagesContext, ReportContext};
use crate::features::reports::services::{ReportService, SynthesisService};
use crate::features::research::ResearchService;
use crate::modules::storage::ReportRecord;

/// Drives an intake through the wizard: collect, store uploads, research,
/// synthesize, persist, retrieve.
pub struct IntakeService {
    sessions: Arc<SessionStore>,
    file_service: Arc<FileService>,
    report_service: Arc<ReportService>,
    extraction_service: Arc<ExtractionService>,
    research_service: Arc<ResearchService>,
    synthesis_service: Arc<SynthesisService>,
}

impl IntakeService {
    pub fn new(
        file_service: Arc<FileService>,
        report_service: Arc<ReportService>,
        extraction_service: Arc<ExtractionService>,
        research_service: Arc<ResearchService>,
        synthesis_service: Arc<SynthesisService>,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            file_service,
            report_service,
            extraction_service,
            research_service,
            synthesis_service,
        }
    }

    pub async fn create_session(&self) -> IntakeSession {
        let session = self.sessions.create().await;
        tracing::info!(intake_id = %session.id, "Intake session created");
        session
    }

    pub async fn get_session(&self, id: Uuid) -> Result<IntakeSession> {
        self.sessions.get(id).await
    }

    /// Drop sessions that have been idle for longer than `ttl`
    pub async fn evict_idle_sessions(&self, ttl: Duration) -> usize {
        let evicted = self.sessions.evict_idle(ttl).await;
        if evicted > 0 {
            tracing::info!(evicted, "Idle intake sessions evicted");
        }
        evicted
    }

    pub async fn submit_client_information(
        &self,
        id: Uuid,
        dto: ClientInformationDto,
    ) -> Result<IntakeSession> {
        self.sessions
            .get(id)
            .await?
            .ensure_step(WizardStep::ClientInformation)?;
        dto.validate()?;

        self.sessions
            .update(id, |session| {
                session.ensure_step(WizardStep::ClientInformation)?;
                session.data.user_id = dto.user_id.trim().to_string();
                session.data.client_name = dto.client_name.trim().to_string();
                session.data.incident_date = dto.incident_date;
                session.data.contact_info = dto
                    .contact_info
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty());
                session.advance()?;
                Ok(session.clone())
            })
            .await
    }

    pub async fn submit_incident_overview(
        &self,
        id: Uuid,
        dto: IncidentOverviewDto,
    ) -> Result<IntakeSession> {
        self.sessions
            .get(id)
            .await?
            .ensure_step(WizardStep::IncidentOverview)?;
        dto.validate()?;

        self.sessions
            .update(id, |session| {
                session.ensure_step(WizardStep::IncidentOverview)?;
                session.data.incident_overview = dto.incident_overview.trim().to_string();
                session.advance()?;
                Ok(session.clone())
            })
            .await
    }

    pub async fn submit_compensation(
        &self,
        id: Uuid,
        dto: CompensationDto,
    ) -> Result<IntakeSession> {
        self.sessions
            .get(id)
            .await?
            .ensure_step(WizardStep::Compensation)?;
        dto.validate()?;

        self.sessions
            .update(id, |session| {
                session.ensure_step(WizardStep::Compensation)?;
                session.data.damages = dto.damages();
                session.advance()?;
                Ok(session.clone())
            })
            .await
    }

    /// Store every upload under the intake's user id and keep it for extraction.
    /// An empty submission just moves the wizard on.
    pub async fn submit_uploads(
        &self,
        id: Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<StoredUploadDto>> {
        let claim = self.sessions.claim(id, WizardStep::Uploads).await?;
        let user_id = claim.session().data.user_id.clone();

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            match self.file_service.store_upload(&file, &user_id).await {
                Ok(file_id) => stored.push(StoredUpload::new(file_id, file)),
                Err(e) => {
                    claim.release().await;
                    return Err(e);
                }
            }
        }

        let response: Vec<StoredUploadDto> = stored
            .iter()
            .map(|u| StoredUploadDto {
                id: u.id,
                filename: u.file.name.clone(),
                filetype: u.file.content_type.clone(),
                file_size: u.file_size,
            })
            .collect();

        claim
            .complete(|session| {
                session.data.uploads.extend(stored);
                session.advance()
            })
            .await?;

        tracing::info!(intake_id = %id, files = response.len(), "Uploads stored");
        Ok(response)
    }

    /// Research, extract, synthesize and store the report.
    ///
    /// The step is claimed for the whole run so overlapping requests get a
    /// conflict instead of storing a second report. When synthesis fails the
    /// wizard stays on the generation step. Upload payloads are dropped once
    /// the report is stored.
    pub async fn generate_report(&self, id: Uuid) -> Result<GeneratedReportDto> {
        let claim = self.sessions.claim(id, WizardStep::GenerateReport).await?;

        let outcome = self.synthesize(&claim.session().data).await;
        let (record, notices) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                claim.release().await;
                return Err(e);
            }
        };

        let report = GeneratedReport {
            id: record.id,
            html: record.report_html.clone(),
            created_at: record.created_at,
        };

        claim
            .complete(|session| {
                session.data.report = Some(report);
                for upload in &mut session.data.uploads {
                    upload.release_payload();
                }
                session.advance()
            })
            .await?;

        tracing::info!(intake_id = %id, report_id = %record.id, "Report generated");

        Ok(GeneratedReportDto {
            report_id: record.id,
            report_html: record.report_html,
            created_at: record.created_at,
            notices,
            view_url: format!("/api/intakes/{}/report", id),
            download_url: format!("/api/intakes/{}/report/download", id),
        })
    }

    async fn synthesize(&self, data: &IntakeData) -> Result<(ReportRecord, Vec<String>)> {
        let findings = self.research_service.research(&data.incident_overview).await;
        let jurisdiction = self.research_service.jurisdiction().to_string();

        let mut notices = Vec::new();
        if findings.legal.is_empty() {
            notices.push(format!("No relevant {} law results found", jurisdiction));
        }
        if findings.medical.is_empty() {
            notices.push("No relevant medical literature results found".to_string());
        }

        let files: Vec<UploadedFile> = data.uploads.iter().map(|u| u.file.clone()).collect();
        let extracted = self.extraction_service.extract_all(&files).await;

        let incident_date = data
            .incident_date
            .ok_or_else(|| AppError::Internal("Intake has no incident date".to_string()))?;

        let context = ReportContext::new(
            ClientContext {
                client_name: data.client_name.clone(),
                incident_date: incident_date.to_string(),
                contact_info: data.contact_info.clone(),
            },
            self.extraction_service.cap_text(&data.incident_overview),
            &extracted,
            DamagesContext::new(
                data.damages.economic,
                data.damages.non_economic,
                data.damages.punitive,
            ),
            jurisdiction,
            findings,
        );

        let html = self.synthesis_service.generate_report(&context).await?;
        let record = self.report_service.store(&data.user_id, html).await?;
        Ok((record, notices))
    }

    /// The report generated by this intake
    pub async fn get_report(&self, id: Uuid) -> Result<GeneratedReport> {
        self.sessions
            .get(id)
            .await?
            .data
            .report
            .ok_or_else(|| {
                AppError::NotFound(format!("No report has been generated for intake {}", id))
            })
    }

    /// List stored reports for `user_id`, or for the intake's user when absent
    pub async fn retrieve_reports(
        &self,
        id: Uuid,
        user_id: Option<String>,
    ) -> Result<Vec<ReportRecord>> {
        let session = self.sessions.get(id).await?;
        session.ensure_step(WizardStep::RetrieveReports)?;

        let user_id = user_id
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(session.data.user_id);

        let reports = self.report_service.list_by_user(&user_id).await?;

        self.sessions
            .update(id, |session| {
                session.ensure_step(WizardStep::RetrieveReports)?;
                session.advance()
            })
            .await?;

        Ok(reports)
    }
}
