//! Engagement and relationship consistency service.
//!
//! Maintains derived counters (follow/follower, favorites, comments,
//! work counts) as users act concurrently, and serves a keyset-paginated
//! feed annotated with viewer-specific relationship state.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
