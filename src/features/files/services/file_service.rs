use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::dtos::FileResponseDto;
use crate::features::files::models::UploadedFile;
use crate::modules::storage::{DocumentStore, NewFile};

/// Service for storing and listing uploaded files
pub struct FileService {
    store: Arc<dyn DocumentStore>,
}

impl FileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store an uploaded file tagged with `user_id` and return its generated id
    pub async fn store_upload(&self, file: &UploadedFile, user_id: &str) -> Result<Uuid> {
        let id = self
            .store
            .store_file(NewFile {
                filename: file.name.clone(),
                filetype: file.content_type.clone(),
                user_id: user_id.to_string(),
                data: file.data.clone(),
            })
            .await?;

        info!(
            "Upload stored: id={}, filename={}, size={}",
            id,
            file.name,
            file.data.len()
        );

        Ok(id)
    }

    /// Metadata of every file stored for `user_id`
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<FileResponseDto>> {
        let files = self.store.list_files_by_user(user_id).await?;
        Ok(files.into_iter().map(FileResponseDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryDocumentStore;

    #[tokio::test]
    async fn test_store_then_list_by_user() {
        let service = FileService::new(Arc::new(MemoryDocumentStore::new()));
        let file = UploadedFile {
            name: "xray.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        };

        let id = service.store_upload(&file, "1234").await.unwrap();

        let listed = service.list_by_user("1234").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].filename, "xray.png");
        assert_eq!(listed[0].filetype, "image/png");
        assert_eq!(listed[0].file_size, 4);
        assert_eq!(listed[0].user_id, "1234");

        assert!(service.list_by_user("9999").await.unwrap().is_empty());
    }
}
