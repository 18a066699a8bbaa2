use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::files::dtos::UploadFilesDto;
use crate::features::files::models::UploadedFile;
use crate::features::intake::dtos::{
    ClientInformationDto, CompensationDto, GeneratedReportDto, IncidentOverviewDto,
    IntakeSessionDto, RetrieveReportsDto, StoredUploadDto, UploadField,
};
use crate::features::intake::services::IntakeService;
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::reports::handlers::{html_attachment, html_page};
use crate::shared::constants::{MAX_FILE_SIZE, NO_REPORTS_FOUND};
use crate::shared::types::{ApiResponse, Meta};

/// Start a new intake
#[utoipa::path(
    post,
    path = "/api/intakes",
    tag = "intake",
    responses(
        (status = 201, description = "Intake created on step 1", body = ApiResponse<IntakeSessionDto>)
    )
)]
pub async fn create_intake(
    State(service): State<Arc<IntakeService>>,
) -> (StatusCode, Json<ApiResponse<IntakeSessionDto>>) {
    let session = service.create_session().await;
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(IntakeSessionDto::from(&session)),
            Some("Intake created".to_string()),
            None,
        )),
    )
}

/// Get the current step and collected data of an intake
#[utoipa::path(
    get,
    path = "/api/intakes/{id}",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    responses(
        (status = 200, description = "Intake found", body = ApiResponse<IntakeSessionDto>),
        (status = 404, description = "Intake not found")
    )
)]
pub async fn get_intake(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IntakeSessionDto>>> {
    let session = service.get_session(id).await?;
    Ok(Json(ApiResponse::success(
        Some(IntakeSessionDto::from(&session)),
        None,
        None,
    )))
}

/// Step 1: submit client information
#[utoipa::path(
    put,
    path = "/api/intakes/{id}/client",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    request_body = ClientInformationDto,
    responses(
        (status = 200, description = "Saved; intake moved to step 2", body = ApiResponse<IntakeSessionDto>),
        (status = 400, description = "Missing client name, user id or incident date"),
        (status = 404, description = "Intake not found"),
        (status = 409, description = "Intake is not on this step")
    )
)]
pub async fn submit_client_information(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ClientInformationDto>,
) -> Result<Json<ApiResponse<IntakeSessionDto>>> {
    let session = service.submit_client_information(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(IntakeSessionDto::from(&session)),
        Some("Client information saved".to_string()),
        None,
    )))
}

/// Step 2: submit the incident narrative
#[utoipa::path(
    put,
    path = "/api/intakes/{id}/incident",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    request_body = IncidentOverviewDto,
    responses(
        (status = 200, description = "Saved; intake moved to step 3", body = ApiResponse<IntakeSessionDto>),
        (status = 400, description = "Empty narrative"),
        (status = 404, description = "Intake not found"),
        (status = 409, description = "Intake is not on this step")
    )
)]
pub async fn submit_incident_overview(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<IncidentOverviewDto>,
) -> Result<Json<ApiResponse<IntakeSessionDto>>> {
    let session = service.submit_incident_overview(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(IntakeSessionDto::from(&session)),
        Some("Incident overview saved".to_string()),
        None,
    )))
}

/// Step 3: submit estimated damages
#[utoipa::path(
    put,
    path = "/api/intakes/{id}/compensation",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    request_body = CompensationDto,
    responses(
        (status = 200, description = "Saved; intake moved to step 4", body = ApiResponse<IntakeSessionDto>),
        (status = 400, description = "Negative or malformed amount"),
        (status = 404, description = "Intake not found"),
        (status = 409, description = "Intake is not on this step")
    )
)]
pub async fn submit_compensation(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CompensationDto>,
) -> Result<Json<ApiResponse<IntakeSessionDto>>> {
    let session = service.submit_compensation(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(IntakeSessionDto::from(&session)),
        Some("Compensation saved".to_string()),
        None,
    )))
}

/// Step 4: upload supporting documents and photos
///
/// Accepts multipart/form-data with any number of:
/// - `documents`: PDF or DOCX files
/// - `photos`: JPG, JPEG or PNG files
///
/// Each file is stored right away under the intake's user id.
#[utoipa::path(
    post,
    path = "/api/intakes/{id}/uploads",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    request_body(
        content = UploadFilesDto,
        content_type = "multipart/form-data",
        description = "Repeated `documents` and `photos` file fields; both optional",
    ),
    responses(
        (status = 201, description = "Files stored; intake moved to step 5", body = ApiResponse<Vec<StoredUploadDto>>),
        (status = 400, description = "Unsupported file type or file too large"),
        (status = 404, description = "Intake not found"),
        (status = 409, description = "Intake is not on this step")
    )
)]
pub async fn submit_uploads(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<StoredUploadDto>>>)> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        let Some(upload_field) = UploadField::from_name(&field_name) else {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        };

        let name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        // Browsers send an empty part when no file was chosen
        if data.is_empty() && name == "unnamed" {
            continue;
        }

        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::BadRequest(format!(
                "File '{}' is too large. Maximum size is {} MB",
                name,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        let file = UploadedFile {
            name,
            content_type,
            data: data.to_vec(),
        };
        match file.kind() {
            Some(kind) if upload_field.accepts(kind) => files.push(file),
            _ => {
                return Err(AppError::BadRequest(format!(
                    "File '{}' is not allowed in '{}'. Allowed types: {}",
                    file.name,
                    field_name,
                    upload_field.allowed_extensions()
                )))
            }
        }
    }

    let stored = service.submit_uploads(id, files).await?;
    let total = stored.len();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(stored),
            Some(format!("{} file(s) uploaded", total)),
            Some(Meta::total(total)),
        )),
    ))
}

/// Step 5: research, synthesize and store the legal report
#[utoipa::path(
    post,
    path = "/api/intakes/{id}/report",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    responses(
        (status = 201, description = "Report generated and stored; intake moved to step 6", body = ApiResponse<GeneratedReportDto>),
        (status = 404, description = "Intake not found"),
        (status = 409, description = "Intake is not on this step"),
        (status = 502, description = "Report generation failed; intake stays on step 5")
    )
)]
pub async fn generate_report(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<GeneratedReportDto>>)> {
    let report = service.generate_report(id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(report),
            Some("Report generated successfully".to_string()),
            None,
        )),
    ))
}

/// Render the intake's report as HTML
#[utoipa::path(
    get,
    path = "/api/intakes/{id}/report",
    operation_id = "view_intake_report",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    responses(
        (status = 200, description = "Report HTML", content_type = "text/html", body = String),
        (status = 404, description = "Intake not found or no report generated yet")
    )
)]
pub async fn view_report(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let report = service.get_report(id).await?;
    Ok(html_page(report.html))
}

/// Download the intake's report as `legal_report_YYYYMMDD.html`
#[utoipa::path(
    get,
    path = "/api/intakes/{id}/report/download",
    operation_id = "download_intake_report",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    responses(
        (status = 200, description = "Report HTML attachment", content_type = "text/html", body = String),
        (status = 404, description = "Intake not found or no report generated yet")
    )
)]
pub async fn download_report(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let report = service.get_report(id).await?;
    let filename = format!("legal_report_{}.html", report.created_at.format("%Y%m%d"));
    Ok(html_attachment(&filename, report.html))
}

/// Step 6: list stored reports for a user id
#[utoipa::path(
    post,
    path = "/api/intakes/{id}/retrieval",
    tag = "intake",
    params(("id" = Uuid, Path, description = "Intake ID")),
    request_body = RetrieveReportsDto,
    responses(
        (status = 200, description = "Reports for the user, possibly empty", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 404, description = "Intake not found"),
        (status = 409, description = "Intake is not on this step")
    )
)]
pub async fn retrieve_reports(
    State(service): State<Arc<IntakeService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RetrieveReportsDto>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.retrieve_reports(id, dto.user_id).await?;
    let total = reports.len();
    let message = (total == 0).then(|| NO_REPORTS_FOUND.to_string());
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        message,
        Some(Meta::total(total)),
    )))
}
