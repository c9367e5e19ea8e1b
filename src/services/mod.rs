pub mod content_store;
pub mod github;
pub mod staging;
pub mod upload_service;
