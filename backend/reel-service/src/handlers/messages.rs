/// Direct messages: append-only send and incremental history.
use actix_web::{web, HttpResponse};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::MessageItem;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub to_user_id: i64,

    #[validate(length(min = 1, max = 512))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Exclusive lower bound in Unix milliseconds; 0 (the default)
    /// fetches the full history. Clients poll with the timestamp of the
    /// last message they already have.
    #[serde(default)]
    pub since: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageItem>,
}

/// POST /api/v1/messages
pub async fn send(
    pool: web::Data<PgPool>,
    viewer: UserId,
    req: web::Json<SendMessageRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if req.to_user_id == viewer.0 {
        return Err(AppError::SelfAction("cannot message yourself".into()));
    }
    if !db::users::exists(&pool, req.to_user_id).await? {
        return Err(AppError::NotFound(format!("user {}", req.to_user_id)));
    }

    let message = db::messages::insert_message(&pool, viewer.0, req.to_user_id, &req.content).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message_id": message.id,
        "created_at": message.created_at.timestamp_millis(),
    })))
}

/// GET /api/v1/messages/{peer_id}?since=... — both directions, ascending.
pub async fn history(
    pool: web::Data<PgPool>,
    viewer: UserId,
    path: web::Path<i64>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    let peer_id = path.into_inner();

    if query.since < 0 {
        return Err(AppError::Validation("since must not be negative".into()));
    }
    let since = DateTime::from_timestamp_millis(query.since)
        .ok_or_else(|| AppError::Validation("since out of range".into()))?;

    let rows = db::messages::history_between(&pool, viewer.0, peer_id, since).await?;
    let messages = rows.into_iter().map(MessageItem::from).collect();

    Ok(HttpResponse::Ok().json(MessageListResponse { messages }))
}
