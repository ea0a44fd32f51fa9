pub mod auth;
pub mod content;
pub mod events;
pub mod image;
pub mod normalizer;
pub mod posts;
