pub mod auth;
pub mod comments;
pub mod favorites;
pub mod messages;
pub mod relations;
pub mod users;
pub mod videos;
