use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::reports::dtos::{ReportOwnerQuery, ReportResponseDto};
use crate::features::reports::services::ReportService;
use crate::shared::constants::{HTML_CONTENT_TYPE, NO_REPORTS_FOUND};
use crate::shared::types::{ApiResponse, Meta};

/// Serve HTML inline
pub fn html_page(html: String) -> Response {
    ([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response()
}

/// Serve HTML as a file download named `filename`
pub fn html_attachment(filename: &str, html: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, HTML_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        html,
    )
        .into_response()
}

/// List all reports generated for a user
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportOwnerQuery),
    responses(
        (status = 200, description = "Reports for the user, possibly empty", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Missing user_id")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(service): State<Arc<ReportService>>,
    AppQuery(query): AppQuery<ReportOwnerQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    query.validate()?;

    let reports = service.list_by_user(query.user_id.trim()).await?;
    let total = reports.len();
    let message = (total == 0).then(|| NO_REPORTS_FOUND.to_string());
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        message,
        Some(Meta::total(total)),
    )))
}

/// Download a stored report as `report_{id}.html`
#[utoipa::path(
    get,
    path = "/api/reports/{id}/download",
    params(
        ("id" = Uuid, Path, description = "Report ID"),
        ReportOwnerQuery
    ),
    responses(
        (status = 200, description = "Report HTML", content_type = "text/html", body = String),
        (status = 400, description = "Missing user_id"),
        (status = 404, description = "Report not found for this user")
    ),
    tag = "reports"
)]
pub async fn download_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppQuery(query): AppQuery<ReportOwnerQuery>,
) -> Result<Response> {
    query.validate()?;

    let report = service.get_for_user(query.user_id.trim(), id).await?;
    Ok(html_attachment(
        &format!("report_{}.html", report.id),
        report.report_html,
    ))
}
