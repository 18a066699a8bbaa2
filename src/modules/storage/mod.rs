//! Document store for uploaded files and generated reports
//!
//! Every record is tagged with exactly one user id and all reads are scoped
//! by it. Two backends exist: PostgreSQL for deployments and an in-memory
//! store for local runs and tests.

mod document_store;
mod memory_store;
mod postgres_store;
mod records;

pub use document_store::DocumentStore;
pub use memory_store::MemoryDocumentStore;
pub use postgres_store::PgDocumentStore;
pub use records::{FileRecord, NewFile, NewReport, ReportRecord};
