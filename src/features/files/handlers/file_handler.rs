use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::files::dtos::{FileListQuery, FileResponseDto};
use crate::features::files::services::FileService;
use crate::shared::types::{ApiResponse, Meta};

/// List stored files for a user
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Files stored for the user", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 400, description = "Missing user_id")
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
    AppQuery(query): AppQuery<FileListQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>, AppError> {
    query.validate()?;

    let files = service.list_by_user(query.user_id.trim()).await?;
    let total = files.len();

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta::total(total)),
    )))
}

#[cfg(test)]
mod tests {
    use crate::features::files::models::UploadedFile;
    use crate::features::files::{routes, FileService};
    use crate::modules::storage::MemoryDocumentStore;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_files_by_user() {
        let service = Arc::new(FileService::new(Arc::new(MemoryDocumentStore::new())));
        service
            .store_upload(
                &UploadedFile {
                    name: "police_report.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    data: b"%PDF-1.4".to_vec(),
                },
                "1234",
            )
            .await
            .unwrap();
        let server = TestServer::new(routes(service)).unwrap();

        let response = server.get("/api/files").add_query_param("user_id", "1234").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["filename"], "police_report.pdf");
        assert_eq!(body["data"][0]["file_size"], 8);

        let body: Value = server
            .get("/api/files")
            .add_query_param("user_id", "5678")
            .await
            .json();
        assert_eq!(body["meta"]["total"], 0);

        server
            .get("/api/files")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
