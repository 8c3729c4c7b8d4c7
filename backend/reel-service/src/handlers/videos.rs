/// Video publishing, deletion, per-user lists and the cursor-paginated
/// feed.
///
/// The feed cursor is a publish timestamp in Unix milliseconds: a page
/// holds videos published strictly before the cursor, newest first, and
/// `next_time` is the last item's publish time. Keyset pagination, so
/// concurrent publishes can't skip or duplicate items between pages.
use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{UserCard, UserCardRow, Video, VideoItem};
use crate::security::tokens::TokenManager;
use crate::services::{EngagementService, MembershipResolver};

/// Fixed feed page size; not client-tunable.
pub const FEED_PAGE_SIZE: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Cursor: only videos published strictly before this Unix-ms
    /// timestamp are returned. Absent means "now."
    pub latest_time: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub videos: Vec<VideoItem>,
    /// Cursor for the next (older) page, in Unix milliseconds. Absent
    /// when the page came back empty.
    pub next_time: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PublishRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub play_url: String,

    #[validate(length(min = 1))]
    pub cover_url: String,
}

/// Turn an optional millisecond cursor into the feed's exclusive upper
/// bound, defaulting to now.
fn cursor_to_instant(latest_time: Option<i64>) -> Result<DateTime<Utc>> {
    match latest_time {
        None => Ok(Utc::now()),
        Some(ms) if ms < 0 => Err(AppError::Validation("cursor must not be negative".into())),
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| AppError::Validation("cursor out of range".into())),
    }
}

/// The next cursor is the publish time of the last (oldest) item on the
/// page, already in milliseconds.
fn next_cursor(items: &[VideoItem]) -> Option<i64> {
    items.last().map(|item| item.publish_time)
}

/// Assemble response items for a batch of videos: author cards in one
/// query, favorite and follow annotations in one resolver call each.
pub(crate) async fn build_video_items(
    pool: &PgPool,
    resolver: &MembershipResolver,
    viewer_id: Option<i64>,
    videos: Vec<Video>,
) -> Result<Vec<VideoItem>> {
    if videos.is_empty() {
        return Ok(Vec::new());
    }

    let video_ids: Vec<i64> = videos.iter().map(|v| v.id).collect();
    let mut author_ids: Vec<i64> = videos.iter().map(|v| v.user_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let cards: HashMap<i64, UserCardRow> = db::users::get_cards(pool, &author_ids)
        .await?
        .into_iter()
        .map(|row| (row.id, row))
        .collect();
    let favorited = resolver.favorited_of(viewer_id, &video_ids).await?;
    let followed = resolver.followed_of(viewer_id, &author_ids).await?;

    videos
        .into_iter()
        .map(|video| {
            let row = cards
                .get(&video.user_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("no profile for user {}", video.user_id)))?;
            let author = UserCard::from_row(row, followed.contains(&video.user_id));
            let is_favorite = favorited.contains(&video.id);
            Ok(VideoItem::from_parts(video, author, is_favorite))
        })
        .collect()
}

/// GET /api/v1/feed — the one endpoint that admits anonymous viewers; an
/// absent or invalid token just annotates everything as not-favorited /
/// not-followed.
pub async fn get_feed(
    pool: web::Data<PgPool>,
    resolver: web::Data<MembershipResolver>,
    tokens: web::Data<TokenManager>,
    query: web::Query<FeedQuery>,
    http_req: HttpRequest,
) -> Result<HttpResponse> {
    let before = cursor_to_instant(query.latest_time)?;
    let viewer_id = tokens.identify(&http_req);

    let page = db::videos::feed_page(&pool, before, FEED_PAGE_SIZE).await?;
    let videos = build_video_items(&pool, &resolver, viewer_id, page).await?;

    Ok(HttpResponse::Ok().json(FeedResponse {
        next_time: next_cursor(&videos),
        videos,
    }))
}

/// GET /api/v1/users/{id}/videos
pub async fn list_videos(
    pool: web::Data<PgPool>,
    resolver: web::Data<MembershipResolver>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let target_id = path.into_inner();

    if !db::users::exists(&pool, target_id).await? {
        return Err(AppError::NotFound(format!("user {}", target_id)));
    }

    let page = db::videos::list_by_user(&pool, target_id).await?;
    let videos = build_video_items(&pool, &resolver, Some(viewer.0), page).await?;

    Ok(HttpResponse::Ok().json(VideoListResponse { videos }))
}

/// POST /api/v1/videos
pub async fn publish(
    engagement: web::Data<EngagementService>,
    viewer: UserId,
    req: web::Json<PublishRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let video = engagement
        .publish_video(viewer.0, &req.title, &req.play_url, &req.cover_url)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "video_id": video.id,
        "publish_time": video.publish_time.timestamp_millis(),
    })))
}

/// DELETE /api/v1/videos/{id}
pub async fn delete(
    engagement: web::Data<EngagementService>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    engagement.delete_video(viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}
