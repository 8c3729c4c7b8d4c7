/// User and profile persistence.
use sqlx::{PgConnection, PgPool};

use crate::models::{User, UserCardRow, UserProfile};

// Seed assets for new profiles, picked by user id so the choice is stable.
const DEFAULT_AVATARS: [&str; 6] = [
    "https://cdn.reel.dev/avatars/default-0.png",
    "https://cdn.reel.dev/avatars/default-1.png",
    "https://cdn.reel.dev/avatars/default-2.png",
    "https://cdn.reel.dev/avatars/default-3.png",
    "https://cdn.reel.dev/avatars/default-4.png",
    "https://cdn.reel.dev/avatars/default-5.png",
];

const DEFAULT_BACKGROUNDS: [&str; 6] = [
    "https://cdn.reel.dev/backgrounds/default-0.jpg",
    "https://cdn.reel.dev/backgrounds/default-1.jpg",
    "https://cdn.reel.dev/backgrounds/default-2.jpg",
    "https://cdn.reel.dev/backgrounds/default-3.jpg",
    "https://cdn.reel.dev/backgrounds/default-4.jpg",
    "https://cdn.reel.dev/backgrounds/default-5.jpg",
];

const DEFAULT_SIGNATURES: [&str; 6] = [
    "No bio yet.",
    "Making videos, one take at a time.",
    "Here for the comments.",
    "Scrolling responsibly.",
    "Creator in progress.",
    "Say it with a video.",
];

/// Create a user and its profile in one transaction. Every user has
/// exactly one profile; there is no path that creates one without the
/// other. A duplicate username surfaces as a unique-violation error.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash)
        VALUES ($1, $2)
        RETURNING id, username, password_hash, created_at
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await?;

    let seed = (user.id.unsigned_abs() as usize) % DEFAULT_AVATARS.len();
    sqlx::query(
        r#"
        INSERT INTO user_profiles (user_id, avatar_url, background_url, signature)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user.id)
    .bind(DEFAULT_AVATARS[seed])
    .bind(DEFAULT_BACKGROUNDS[seed])
    .bind(DEFAULT_SIGNATURES[seed])
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(user)
}

/// Find user by username (login path)
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Check whether a user exists
pub async fn exists(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Same existence check on the coordinator's transaction
pub async fn exists_on(conn: &mut PgConnection, user_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
}

/// Joined user + profile card for a single user
pub async fn get_card(pool: &PgPool, user_id: i64) -> Result<Option<UserCardRow>, sqlx::Error> {
    sqlx::query_as::<_, UserCardRow>(
        r#"
        SELECT u.id, u.username, p.avatar_url, p.background_url, p.signature,
               p.follow_count, p.follower_count, p.total_favorited, p.work_count, p.favorite_count
        FROM users u
        JOIN user_profiles p ON p.user_id = u.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Batch card lookup for annotating feeds and lists; one query for any
/// number of ids.
pub async fn get_cards(pool: &PgPool, user_ids: &[i64]) -> Result<Vec<UserCardRow>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, UserCardRow>(
        r#"
        SELECT u.id, u.username, p.avatar_url, p.background_url, p.signature,
               p.follow_count, p.follower_count, p.total_favorited, p.work_count, p.favorite_count
        FROM users u
        JOIN user_profiles p ON p.user_id = u.id
        WHERE u.id = ANY($1)
        "#,
    )
    .bind(user_ids)
    .fetch_all(pool)
    .await
}

/// Raw counter record for a user
pub async fn get_profile(pool: &PgPool, user_id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT user_id, follow_count, follower_count, total_favorited, work_count,
               favorite_count, avatar_url, background_url, signature
        FROM user_profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
