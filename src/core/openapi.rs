use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::intake::{
    dtos as intake_dtos, handlers as intake_handlers, models as intake_models,
};
use crate::features::reports::{dtos as reports_dtos, handlers as reports_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Intake wizard
        intake_handlers::create_intake,
        intake_handlers::get_intake,
        intake_handlers::submit_client_information,
        intake_handlers::submit_incident_overview,
        intake_handlers::submit_compensation,
        intake_handlers::submit_uploads,
        intake_handlers::generate_report,
        intake_handlers::view_report,
        intake_handlers::download_report,
        intake_handlers::retrieve_reports,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::download_report,
        // Files
        files_handlers::list_files,
    ),
    components(
        schemas(
            Meta,
            // Intake
            intake_models::WizardStep,
            intake_dtos::ClientInformationDto,
            intake_dtos::IncidentOverviewDto,
            intake_dtos::CompensationDto,
            intake_dtos::RetrieveReportsDto,
            intake_dtos::DamagesDto,
            intake_dtos::StoredUploadDto,
            intake_dtos::IntakeSessionDto,
            intake_dtos::GeneratedReportDto,
            ApiResponse<intake_dtos::IntakeSessionDto>,
            ApiResponse<intake_dtos::GeneratedReportDto>,
            ApiResponse<Vec<intake_dtos::StoredUploadDto>>,
            // Reports
            reports_dtos::ReportResponseDto,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            // Files
            files_dtos::UploadFilesDto,
            files_dtos::FileResponseDto,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
        )
    ),
    tags(
        (name = "intake", description = "Case intake wizard, one endpoint per step"),
        (name = "reports", description = "Stored legal reports"),
        (name = "files", description = "Stored uploads"),
    ),
    info(
        title = "Legal Report API",
        version = "0.1.0",
        description = "Case intake and legal report generation",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_wizard_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/intakes",
            "/api/intakes/{id}/uploads",
            "/api/intakes/{id}/report/download",
            "/api/reports/{id}/download",
            "/api/files",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Intake".to_string(),
            version: "9.9.9".to_string(),
            description: "Staging".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Intake");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("Staging"));
    }
}
