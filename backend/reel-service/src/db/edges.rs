/// Relationship store: follow and favorite edges.
///
/// Create/delete primitives report whether a row was actually inserted or
/// removed, so callers can tell a fresh mutation from a duplicate or a
/// missing edge without a prior read. Uniqueness of each pair is enforced
/// by the table constraints, not by the caller.
use sqlx::{PgConnection, PgPool};

use crate::models::UserCardRow;

/// Insert a follow edge. `Ok(true)` means a new row was created;
/// `Ok(false)` means the edge already existed.
pub async fn insert_follow(
    conn: &mut PgConnection,
    from_user_id: i64,
    to_user_id: i64,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (i64,)>(
        r#"
        INSERT INTO relations (from_user_id, to_user_id)
        VALUES ($1, $2)
        ON CONFLICT (from_user_id, to_user_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(from_user_id)
    .bind(to_user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(inserted.is_some())
}

/// Delete a follow edge. `Ok(false)` means there was nothing to delete.
pub async fn delete_follow(
    conn: &mut PgConnection,
    from_user_id: i64,
    to_user_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM relations WHERE from_user_id = $1 AND to_user_id = $2")
        .bind(from_user_id)
        .bind(to_user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert a favorite edge. Same created/already-exists contract as
/// [`insert_follow`].
pub async fn insert_favorite(
    conn: &mut PgConnection,
    user_id: i64,
    video_id: i64,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (i64,)>(
        r#"
        INSERT INTO favorites (user_id, video_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, video_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(inserted.is_some())
}

/// Delete a favorite edge. `Ok(false)` means there was nothing to delete.
pub async fn delete_favorite(
    conn: &mut PgConnection,
    user_id: i64,
    video_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND video_id = $2")
        .bind(user_id)
        .bind(video_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove every favorite edge pointing at a video and settle each
/// liker's profile `favorite_count` in the same statement, so an edge
/// committed between a separate settle and delete cannot leave a liker
/// counted without an edge. Returns how many edges were removed, which
/// is also the owner's `total_favorited` delta.
pub async fn drain_video_favorites(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        WITH gone AS (
            DELETE FROM favorites
            WHERE video_id = $1
            RETURNING user_id
        ), settled AS (
            UPDATE user_profiles p
            SET favorite_count = GREATEST(p.favorite_count - 1, 0)
            FROM gone
            WHERE p.user_id = gone.user_id
        )
        SELECT COUNT(*) FROM gone
        "#,
    )
    .bind(video_id)
    .fetch_one(&mut *conn)
    .await
}

/// Users that `user_id` follows, with their profile cards
pub async fn following_of(pool: &PgPool, user_id: i64) -> Result<Vec<UserCardRow>, sqlx::Error> {
    sqlx::query_as::<_, UserCardRow>(
        r#"
        SELECT u.id, u.username, p.avatar_url, p.background_url, p.signature,
               p.follow_count, p.follower_count, p.total_favorited, p.work_count, p.favorite_count
        FROM relations r
        JOIN users u ON u.id = r.to_user_id
        JOIN user_profiles p ON p.user_id = u.id
        WHERE r.from_user_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Users that follow `user_id`, with their profile cards
pub async fn followers_of(pool: &PgPool, user_id: i64) -> Result<Vec<UserCardRow>, sqlx::Error> {
    sqlx::query_as::<_, UserCardRow>(
        r#"
        SELECT u.id, u.username, p.avatar_url, p.background_url, p.signature,
               p.follow_count, p.follower_count, p.total_favorited, p.work_count, p.favorite_count
        FROM relations r
        JOIN users u ON u.id = r.from_user_id
        JOIN user_profiles p ON p.user_id = u.id
        WHERE r.to_user_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Mutual follows: users `user_id` follows who follow back
pub async fn friends_of(pool: &PgPool, user_id: i64) -> Result<Vec<UserCardRow>, sqlx::Error> {
    sqlx::query_as::<_, UserCardRow>(
        r#"
        SELECT u.id, u.username, p.avatar_url, p.background_url, p.signature,
               p.follow_count, p.follower_count, p.total_favorited, p.work_count, p.favorite_count
        FROM relations r
        JOIN users u ON u.id = r.to_user_id
        JOIN user_profiles p ON p.user_id = u.id
        WHERE r.from_user_id = $1
          AND EXISTS (
              SELECT 1 FROM relations rb
              WHERE rb.from_user_id = r.to_user_id AND rb.to_user_id = $1
          )
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
