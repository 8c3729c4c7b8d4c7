/// Comment actions and per-video comment lists.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{Comment, CommentItem, UserCard};
use crate::services::{EngagementService, MembershipResolver};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 512))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: CommentItem,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentItem>,
}

/// Attach author cards to a batch of comments; one card query plus one
/// follow-annotation query, regardless of list length.
async fn build_comment_items(
    pool: &PgPool,
    resolver: &MembershipResolver,
    viewer_id: i64,
    comments: Vec<Comment>,
) -> Result<Vec<CommentItem>> {
    if comments.is_empty() {
        return Ok(Vec::new());
    }

    let mut author_ids: Vec<i64> = comments.iter().map(|c| c.user_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let cards: std::collections::HashMap<i64, _> = db::users::get_cards(pool, &author_ids)
        .await?
        .into_iter()
        .map(|row| (row.id, row))
        .collect();
    let followed = resolver.followed_of(Some(viewer_id), &author_ids).await?;

    comments
        .into_iter()
        .map(|comment| {
            let row = cards
                .get(&comment.user_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Internal(format!("no profile for user {}", comment.user_id))
                })?;
            let user = UserCard::from_row(row, followed.contains(&comment.user_id));
            Ok(CommentItem::from_parts(comment, user))
        })
        .collect()
}

/// POST /api/v1/videos/{id}/comments
pub async fn create(
    pool: web::Data<PgPool>,
    engagement: web::Data<EngagementService>,
    resolver: web::Data<MembershipResolver>,
    viewer: UserId,
    path: web::Path<i64>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let comment = engagement
        .comment(viewer.0, path.into_inner(), &req.content)
        .await?;

    let mut items = build_comment_items(&pool, &resolver, viewer.0, vec![comment]).await?;
    let comment = items
        .pop()
        .ok_or_else(|| AppError::Internal("comment vanished after insert".into()))?;

    Ok(HttpResponse::Created().json(CommentResponse { comment }))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete(
    engagement: web::Data<EngagementService>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    engagement.delete_comment(viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}

/// GET /api/v1/videos/{id}/comments — newest first.
pub async fn list(
    pool: web::Data<PgPool>,
    resolver: web::Data<MembershipResolver>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();

    if db::videos::find_by_id(&pool, video_id).await?.is_none() {
        return Err(AppError::NotFound(format!("video {}", video_id)));
    }

    let rows = db::comments::list_for_video(&pool, video_id).await?;
    let comments = build_comment_items(&pool, &resolver, viewer.0, rows).await?;

    Ok(HttpResponse::Ok().json(CommentListResponse { comments }))
}
