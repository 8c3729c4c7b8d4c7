/// Database access layer.
///
/// Functions taking `&PgPool` are single-statement reads/writes; functions
/// taking `&mut PgConnection` are building blocks meant to run on the
/// engagement coordinator's transaction (call with `&mut *tx`).
pub mod comments;
pub mod counters;
pub mod edges;
pub mod messages;
pub mod users;
pub mod videos;
