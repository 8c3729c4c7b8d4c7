/// Registration and login.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::security::password::{hash_password, verify_password};
use crate::security::tokens::TokenManager;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 6, max = 25))]
    pub username: String,

    #[validate(length(min = 6, max = 25))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: i64,
    pub token: String,
}

/// POST /api/v1/auth/register
///
/// Creates the user and its profile in one transaction and issues a
/// token right away.
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let user = db::users::create_user(&pool, &req.username, &password_hash)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if err.is_unique_violation() {
                AppError::Conflict(format!("username '{}' is already taken", req.username))
            } else {
                err
            }
        })?;

    let token = tokens.issue(user.id)?;
    info!(user_id = user.id, "registered new user");

    Ok(HttpResponse::Created().json(AuthResponse {
        user_id: user.id,
        token,
    }))
}

/// POST /api/v1/auth/login
///
/// Unknown username and wrong password produce the same response, so the
/// endpoint does not leak which usernames exist.
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = db::users::find_by_username(&pool, &req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid username or password".into()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("invalid username or password".into()));
    }

    let token = tokens.issue(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user_id: user.id,
        token,
    }))
}
