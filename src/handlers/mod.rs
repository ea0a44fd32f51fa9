pub mod agent;
pub mod auth;
pub mod upload;
