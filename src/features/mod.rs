pub mod files;
pub mod intake;
pub mod reports;
pub mod research;
