/// Favorite/unfavorite actions and the favorited-videos list.
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::videos::{build_video_items, VideoListResponse};
use crate::middleware::UserId;
use crate::services::{EngagementService, MembershipResolver};

/// POST /api/v1/videos/{id}/favorite
pub async fn favorite(
    engagement: web::Data<EngagementService>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    engagement.favorite(viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "favorited" })))
}

/// DELETE /api/v1/videos/{id}/favorite
pub async fn unfavorite(
    engagement: web::Data<EngagementService>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    engagement.unfavorite(viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "not_favorited" })))
}

/// GET /api/v1/users/{id}/favorites — videos the target has favorited,
/// annotated for the authenticated viewer.
pub async fn list_favorites(
    pool: web::Data<PgPool>,
    resolver: web::Data<MembershipResolver>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let target_id = path.into_inner();

    if !db::users::exists(&pool, target_id).await? {
        return Err(AppError::NotFound(format!("user {}", target_id)));
    }

    let page = db::videos::list_favorited_by(&pool, target_id).await?;
    let videos = build_video_items(&pool, &resolver, Some(viewer.0), page).await?;

    Ok(HttpResponse::Ok().json(VideoListResponse { videos }))
}
