mod file;

pub use file::{ExtractedFile, FileKind, UploadedFile};
