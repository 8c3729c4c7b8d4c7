/// Direct-message persistence. Append-only, no derived counters; history
/// merges both directions of a pair in one scan thanks to the two
/// pairwise indexes.
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::Message;

pub async fn insert_message(
    pool: &PgPool,
    from_user_id: i64,
    to_user_id: i64,
    content: &str,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (from_user_id, to_user_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, from_user_id, to_user_id, content, created_at
        "#,
    )
    .bind(from_user_id)
    .bind(to_user_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Both directions of a conversation after `since`, oldest first. The
/// exclusive bound lets clients poll incrementally with the timestamp of
/// the last message they have.
pub async fn history_between(
    pool: &PgPool,
    user_id: i64,
    peer_id: i64,
    since: DateTime<Utc>,
) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, from_user_id, to_user_id, content, created_at
        FROM messages
        WHERE ((from_user_id = $1 AND to_user_id = $2)
            OR (from_user_id = $2 AND to_user_id = $1))
          AND created_at > $3
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(peer_id)
    .bind(since)
    .fetch_all(pool)
    .await
}
