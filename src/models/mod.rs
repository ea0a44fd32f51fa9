pub mod event_row;
pub mod posts;
pub mod response;
pub mod users;
