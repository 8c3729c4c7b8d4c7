/// Comment persistence. The owning video's `comment_count` caches the row
/// count for its id; creation and deletion go through the coordinator.
use sqlx::{PgConnection, PgPool};

use crate::models::Comment;

pub async fn insert_comment(
    conn: &mut PgConnection,
    user_id: i64,
    video_id: i64,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (user_id, video_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, video_id, content, created_at
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .bind(content)
    .fetch_one(&mut *conn)
    .await
}

pub async fn find_by_id_on(
    conn: &mut PgConnection,
    comment_id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT id, user_id, video_id, content, created_at FROM comments WHERE id = $1",
    )
    .bind(comment_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Delete one comment. `Ok(false)` means there was nothing to delete.
pub async fn delete_comment_row(
    conn: &mut PgConnection,
    comment_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// A video's comments, newest first.
pub async fn list_for_video(pool: &PgPool, video_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, user_id, video_id, content, created_at
        FROM comments
        WHERE video_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(video_id)
    .fetch_all(pool)
    .await
}

/// Remove every comment on a video (video-delete cascade).
pub async fn delete_video_comments(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE video_id = $1")
        .bind(video_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
