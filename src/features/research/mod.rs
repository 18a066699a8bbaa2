pub mod models;
pub mod services;

pub use models::{ResearchMode, ResearchResult};
pub use services::{ResearchFindings, ResearchService};
