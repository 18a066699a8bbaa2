mod extraction_service;
mod file_service;

pub use extraction_service::ExtractionService;
pub use file_service::FileService;
