use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::intake::handlers;
use crate::features::intake::services::IntakeService;

/// Create routes for the intake wizard
///
/// `max_upload_body` caps the whole multipart body of the uploads step.
pub fn routes(intake_service: Arc<IntakeService>, max_upload_body: usize) -> Router {
    Router::new()
        .route("/api/intakes", post(handlers::create_intake))
        .route("/api/intakes/{id}", get(handlers::get_intake))
        .route(
            "/api/intakes/{id}/client",
            put(handlers::submit_client_information),
        )
        .route(
            "/api/intakes/{id}/incident",
            put(handlers::submit_incident_overview),
        )
        .route(
            "/api/intakes/{id}/compensation",
            put(handlers::submit_compensation),
        )
        .route(
            "/api/intakes/{id}/uploads",
            post(handlers::submit_uploads).layer(DefaultBodyLimit::max(max_upload_body)),
        )
        .route(
            "/api/intakes/{id}/report",
            post(handlers::generate_report).get(handlers::view_report),
        )
        .route(
            "/api/intakes/{id}/report/download",
            get(handlers::download_report),
        )
        .route("/api/intakes/{id}/retrieval", post(handlers::retrieve_reports))
        .with_state(intake_service)
}
