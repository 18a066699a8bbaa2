mod research_result;

pub use research_result::{ResearchMode, ResearchResult};
