/// Video persistence, including the keyset feed query.
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::models::Video;

/// Insert a new video. `publish_time` is assigned by the store at insert
/// and never updated afterwards; it is the feed's ordering key.
pub async fn insert_video(
    conn: &mut PgConnection,
    user_id: i64,
    title: &str,
    play_url: &str,
    cover_url: &str,
) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (user_id, title, play_url, cover_url)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, title, play_url, cover_url, favorite_count, comment_count, publish_time
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(play_url)
    .bind(cover_url)
    .fetch_one(&mut *conn)
    .await
}

pub async fn find_by_id(pool: &PgPool, video_id: i64) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT id, user_id, title, play_url, cover_url, favorite_count, comment_count, publish_time
        FROM videos
        WHERE id = $1
        "#,
    )
    .bind(video_id)
    .fetch_optional(pool)
    .await
}

/// Same lookup on the coordinator's transaction. The favorite path uses
/// this to resolve the owner in the same transaction as the edge
/// mutation, so owner and counters stay consistent.
pub async fn find_by_id_on(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT id, user_id, title, play_url, cover_url, favorite_count, comment_count, publish_time
        FROM videos
        WHERE id = $1
        "#,
    )
    .bind(video_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Lock and fetch a video row ahead of the delete cascade. FOR UPDATE
/// conflicts with the KEY SHARE lock a favorite insert's foreign-key
/// check takes on this row, so no new edge can land under a delete in
/// progress.
pub async fn lock_by_id(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT id, user_id, title, play_url, cover_url, favorite_count, comment_count, publish_time
        FROM videos
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(video_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn exists_on(conn: &mut PgConnection, video_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
        .bind(video_id)
        .fetch_one(&mut *conn)
        .await
}

/// One keyset page of the global feed: videos published strictly before
/// `before`, newest first.
pub async fn feed_page(
    pool: &PgPool,
    before: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT id, user_id, title, play_url, cover_url, favorite_count, comment_count, publish_time
        FROM videos
        WHERE publish_time < $1
        ORDER BY publish_time DESC
        LIMIT $2
        "#,
    )
    .bind(before)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// A user's published videos, newest first.
pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT id, user_id, title, play_url, cover_url, favorite_count, comment_count, publish_time
        FROM videos
        WHERE user_id = $1
        ORDER BY publish_time DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Videos a user has favorited, most recently favorited first.
pub async fn list_favorited_by(pool: &PgPool, user_id: i64) -> Result<Vec<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT v.id, v.user_id, v.title, v.play_url, v.cover_url,
               v.favorite_count, v.comment_count, v.publish_time
        FROM favorites f
        JOIN videos v ON v.id = f.video_id
        WHERE f.user_id = $1
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Delete the video row itself. `Ok(false)` means it was already gone.
pub async fn delete_video_row(conn: &mut PgConnection, video_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
