mod report_context;

pub use report_context::*;
