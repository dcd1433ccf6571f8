pub mod annotation;
pub mod count_service;
pub mod file_manager;
pub mod server;
pub mod staged_upload;
