/// User cards and relation lists, annotated for the authenticated viewer.
use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{UserCard, UserCardRow};
use crate::services::MembershipResolver;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserCard,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserCard>,
}

/// Annotate a batch of card rows with the viewer's "do I follow them"
/// bit in one resolver round trip.
async fn annotate_cards(
    resolver: &MembershipResolver,
    viewer_id: i64,
    rows: Vec<UserCardRow>,
) -> Result<Vec<UserCard>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let followed = resolver.followed_of(Some(viewer_id), &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let is_follow = followed.contains(&row.id);
            UserCard::from_row(row, is_follow)
        })
        .collect())
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    pool: web::Data<PgPool>,
    resolver: web::Data<MembershipResolver>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let target_id = path.into_inner();

    let row = db::users::get_card(&pool, target_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", target_id)))?;

    let followed = resolver.followed_of(Some(viewer.0), &[target_id]).await?;
    let user = UserCard::from_row(row, followed.contains(&target_id));

    Ok(HttpResponse::Ok().json(UserResponse { user }))
}

/// GET /api/v1/users/{id}/following
pub async fn get_following(
    pool: web::Data<PgPool>,
    resolver: web::Data<MembershipResolver>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let target_id = path.into_inner();

    if !db::users::exists(&pool, target_id).await? {
        return Err(AppError::NotFound(format!("user {}", target_id)));
    }

    let rows = db::edges::following_of(&pool, target_id).await?;
    let users = annotate_cards(&resolver, viewer.0, rows).await?;

    Ok(HttpResponse::Ok().json(UserListResponse { users }))
}

/// GET /api/v1/users/{id}/followers
pub async fn get_followers(
    pool: web::Data<PgPool>,
    resolver: web::Data<MembershipResolver>,
    viewer: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let target_id = path.into_inner();

    if !db::users::exists(&pool, target_id).await? {
        return Err(AppError::NotFound(format!("user {}", target_id)));
    }

    let rows = db::edges::followers_of(&pool, target_id).await?;
    let users = annotate_cards(&resolver, viewer.0, rows).await?;

    Ok(HttpResponse::Ok().json(UserListResponse { users }))
}

/// GET /api/v1/friends — the viewer's mutual follows. Every entry is by
/// definition followed by the viewer, so `is_follow` is always true.
pub async fn get_friends(pool: web::Data<PgPool>, viewer: UserId) -> Result<HttpResponse> {
    let rows = db::edges::friends_of(&pool, viewer.0).await?;

    let users: Vec<UserCard> = rows
        .into_iter()
        .map(|row| UserCard::from_row(row, true))
        .collect();

    Ok(HttpResponse::Ok().json(UserListResponse { users }))
}
