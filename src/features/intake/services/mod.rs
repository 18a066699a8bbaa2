mod intake_service;
mod session_store;

pub use intake_service::IntakeService;
