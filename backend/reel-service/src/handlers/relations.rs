/// Follow and unfollow actions.
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::EngagementService;

/// POST /api/v1/users/{id}/follow
pub async fn follow(
    engagement: web::Data<EngagementService>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    engagement.follow(viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "following" })))
}

/// DELETE /api/v1/users/{id}/follow
pub async fn unfollow(
    engagement: web::Data<EngagementService>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    engagement.unfollow(viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "not_following" })))
}
