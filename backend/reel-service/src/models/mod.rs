/// Data models for the engagement service.
///
/// Database entities derive `sqlx::FromRow`; the `*Item`/`*Card` structs
/// are the response DTOs handed to clients, with timestamps converted to
/// Unix milliseconds (the unit of the feed/chat cursors).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ========================================
// Database entities
// ========================================

/// User account row. Never serialized directly (carries the password hash).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Per-user counter record, 1:1 with `users`. Counter columns are derived
/// caches of edge-set cardinalities and are written only by the engagement
/// coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub follow_count: i64,
    pub follower_count: i64,
    pub total_favorited: i64,
    pub work_count: i64,
    pub favorite_count: i64,
    pub avatar_url: String,
    pub background_url: String,
    pub signature: String,
}

/// Published video row. `publish_time` is the feed ordering key, immutable
/// after insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub play_url: String,
    pub cover_url: String,
    pub favorite_count: i64,
    pub comment_count: i64,
    pub publish_time: DateTime<Utc>,
}

/// Comment row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub video_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Direct message row, append-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Joined user + profile projection used wherever a user card is rendered.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCardRow {
    pub id: i64,
    pub username: String,
    pub avatar_url: String,
    pub background_url: String,
    pub signature: String,
    pub follow_count: i64,
    pub follower_count: i64,
    pub total_favorited: i64,
    pub work_count: i64,
    pub favorite_count: i64,
}

// ========================================
// Response DTOs
// ========================================

/// User card with the viewer-specific `is_follow` annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCard {
    pub id: i64,
    pub username: String,
    pub avatar_url: String,
    pub background_url: String,
    pub signature: String,
    pub follow_count: i64,
    pub follower_count: i64,
    pub total_favorited: i64,
    pub work_count: i64,
    pub favorite_count: i64,
    pub is_follow: bool,
}

impl UserCard {
    pub fn from_row(row: UserCardRow, is_follow: bool) -> Self {
        Self {
            id: row.id,
            username: row.username,
            avatar_url: row.avatar_url,
            background_url: row.background_url,
            signature: row.signature,
            follow_count: row.follow_count,
            follower_count: row.follower_count,
            total_favorited: row.total_favorited,
            work_count: row.work_count,
            favorite_count: row.favorite_count,
            is_follow,
        }
    }
}

/// Feed/list video item with author card and viewer annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: i64,
    pub author: UserCard,
    pub title: String,
    pub play_url: String,
    pub cover_url: String,
    pub favorite_count: i64,
    pub comment_count: i64,
    pub is_favorite: bool,
    /// Unix milliseconds; the last item's value is the next feed cursor.
    pub publish_time: i64,
}

impl VideoItem {
    pub fn from_parts(video: Video, author: UserCard, is_favorite: bool) -> Self {
        Self {
            id: video.id,
            author,
            title: video.title,
            play_url: video.play_url,
            cover_url: video.cover_url,
            favorite_count: video.favorite_count,
            comment_count: video.comment_count,
            is_favorite,
            publish_time: video.publish_time.timestamp_millis(),
        }
    }
}

/// Comment with its author card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentItem {
    pub id: i64,
    pub user: UserCard,
    pub content: String,
    /// Unix milliseconds
    pub created_at: i64,
}

impl CommentItem {
    pub fn from_parts(comment: Comment, user: UserCard) -> Self {
        Self {
            id: comment.id,
            user,
            content: comment.content,
            created_at: comment.created_at.timestamp_millis(),
        }
    }
}

/// Chat message DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageItem {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub content: String,
    /// Unix milliseconds; the chat history cursor unit.
    pub created_at: i64,
}

impl From<Message> for MessageItem {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            from_user_id: message.from_user_id,
            to_user_id: message.to_user_id,
            content: message.content,
            created_at: message.created_at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_video_item_publish_time_is_millis() {
        let publish_time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let video = Video {
            id: 1,
            user_id: 2,
            title: "t".into(),
            play_url: "p".into(),
            cover_url: "c".into(),
            favorite_count: 0,
            comment_count: 0,
            publish_time,
        };
        let author = UserCard {
            id: 2,
            username: "a".into(),
            avatar_url: String::new(),
            background_url: String::new(),
            signature: String::new(),
            follow_count: 0,
            follower_count: 0,
            total_favorited: 0,
            work_count: 0,
            favorite_count: 0,
            is_follow: false,
        };

        let item = VideoItem::from_parts(video, author, true);

        assert_eq!(item.publish_time, publish_time.timestamp_millis());
        assert!(item.is_favorite);
    }
}
