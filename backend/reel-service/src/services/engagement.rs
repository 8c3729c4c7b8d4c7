/// Engagement coordinator: the transactional boundary for every
/// counter-bearing action.
///
/// Each method runs one transaction combining the edge/row mutation with
/// every dependent counter mutation. The uniform rule: a counter moves if
/// and only if the edge/row mutation actually happened. An error anywhere
/// drops the transaction, rolling back the whole action; no partial state
/// is ever observable.
use sqlx::PgPool;
use tracing::debug;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Comment, Video};

const COMMENT_MAX_CHARS: usize = 512;
const TITLE_MAX_CHARS: usize = 255;

#[derive(Clone)]
pub struct EngagementService {
    pool: PgPool,
}

impl EngagementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Follow a user: insert the edge, bump the follower's `follow_count`
    /// and the target's `follower_count`. A duplicate edge is a
    /// `Conflict` and leaves every counter untouched.
    pub async fn follow(&self, from_user_id: i64, to_user_id: i64) -> Result<()> {
        if from_user_id == to_user_id {
            return Err(AppError::SelfAction("cannot follow yourself".into()));
        }

        let mut tx = self.pool.begin().await?;

        if !db::users::exists_on(&mut tx, to_user_id).await? {
            return Err(AppError::NotFound(format!("user {}", to_user_id)));
        }

        let created = db::edges::insert_follow(&mut tx, from_user_id, to_user_id).await?;
        if !created {
            return Err(AppError::Conflict(format!(
                "already following user {}",
                to_user_id
            )));
        }

        // Profile rows in ascending id order; mutual follows would
        // otherwise lock the two rows in opposite orders and deadlock.
        if from_user_id < to_user_id {
            db::counters::incr_follow_count(&mut tx, from_user_id).await?;
            db::counters::incr_follower_count(&mut tx, to_user_id).await?;
        } else {
            db::counters::incr_follower_count(&mut tx, to_user_id).await?;
            db::counters::incr_follow_count(&mut tx, from_user_id).await?;
        }

        tx.commit().await?;
        debug!(from_user_id, to_user_id, "follow edge created");
        Ok(())
    }

    /// Unfollow: delete the edge and, only if a row actually went away,
    /// decrement both counters floored at zero. Deleting a missing edge
    /// is a `NoOp`, decremented nothing.
    pub async fn unfollow(&self, from_user_id: i64, to_user_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = db::edges::delete_follow(&mut tx, from_user_id, to_user_id).await?;
        if !deleted {
            return Err(AppError::NoOp(format!("not following user {}", to_user_id)));
        }

        // Same lock order as follow.
        if from_user_id < to_user_id {
            db::counters::decr_follow_count(&mut tx, from_user_id).await?;
            db::counters::decr_follower_count(&mut tx, to_user_id).await?;
        } else {
            db::counters::decr_follower_count(&mut tx, to_user_id).await?;
            db::counters::decr_follow_count(&mut tx, from_user_id).await?;
        }

        tx.commit().await?;
        debug!(from_user_id, to_user_id, "follow edge removed");
        Ok(())
    }

    /// Favorite a video: one edge insert plus three counters — the
    /// video's `favorite_count`, the liker's profile `favorite_count`
    /// and the owner's `total_favorited`. The owner lookup happens on
    /// the same transaction as the edge mutation.
    pub async fn favorite(&self, user_id: i64, video_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let video = db::videos::find_by_id_on(&mut tx, video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("video {}", video_id)))?;

        let created = db::edges::insert_favorite(&mut tx, user_id, video_id).await?;
        if !created {
            return Err(AppError::Conflict(format!(
                "already favorited video {}",
                video_id
            )));
        }

        db::counters::incr_video_favorite_count(&mut tx, video_id).await?;
        db::counters::incr_profile_favorite_count(&mut tx, user_id).await?;
        db::counters::incr_total_favorited(&mut tx, video.user_id).await?;

        tx.commit().await?;
        debug!(user_id, video_id, "favorite edge created");
        Ok(())
    }

    pub async fn unfavorite(&self, user_id: i64, video_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let video = db::videos::find_by_id_on(&mut tx, video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("video {}", video_id)))?;

        let deleted = db::edges::delete_favorite(&mut tx, user_id, video_id).await?;
        if !deleted {
            return Err(AppError::NoOp(format!("video {} not favorited", video_id)));
        }

        db::counters::decr_video_favorite_count(&mut tx, video_id).await?;
        db::counters::decr_profile_favorite_count(&mut tx, user_id).await?;
        db::counters::decr_total_favorited(&mut tx, video.user_id).await?;

        tx.commit().await?;
        debug!(user_id, video_id, "favorite edge removed");
        Ok(())
    }

    /// Post a comment and bump the video's `comment_count` (and only
    /// `comment_count`).
    pub async fn comment(&self, user_id: i64, video_id: i64, content: &str) -> Result<Comment> {
        if content.is_empty() || content.chars().count() > COMMENT_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "comment must be 1..={} characters",
                COMMENT_MAX_CHARS
            )));
        }

        let mut tx = self.pool.begin().await?;

        if !db::videos::exists_on(&mut tx, video_id).await? {
            return Err(AppError::NotFound(format!("video {}", video_id)));
        }

        let comment = db::comments::insert_comment(&mut tx, user_id, video_id, content).await?;
        db::counters::incr_video_comment_count(&mut tx, video_id).await?;

        tx.commit().await?;
        debug!(user_id, video_id, comment_id = comment.id, "comment created");
        Ok(comment)
    }

    /// Delete a comment. Author-only; the video's `comment_count` drops
    /// floored at zero iff the row was actually removed.
    pub async fn delete_comment(&self, requester_id: i64, comment_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let comment = db::comments::find_by_id_on(&mut tx, comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;

        if comment.user_id != requester_id {
            return Err(AppError::Forbidden(
                "only the comment's author may delete it".into(),
            ));
        }

        let deleted = db::comments::delete_comment_row(&mut tx, comment_id).await?;
        if !deleted {
            // Lost the race against another delete of the same row.
            return Err(AppError::NoOp(format!("comment {} already gone", comment_id)));
        }

        db::counters::decr_video_comment_count(&mut tx, comment.video_id).await?;

        tx.commit().await?;
        debug!(requester_id, comment_id, "comment deleted");
        Ok(())
    }

    /// Publish a video and bump the owner's `work_count`.
    pub async fn publish_video(
        &self,
        owner_id: i64,
        title: &str,
        play_url: &str,
        cover_url: &str,
    ) -> Result<Video> {
        if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "title must be 1..={} characters",
                TITLE_MAX_CHARS
            )));
        }

        let mut tx = self.pool.begin().await?;

        let video = db::videos::insert_video(&mut tx, owner_id, title, play_url, cover_url).await?;
        db::counters::incr_work_count(&mut tx, owner_id).await?;

        tx.commit().await?;
        debug!(owner_id, video_id = video.id, "video published");
        Ok(video)
    }

    /// Delete a video, owner-only, cascading inside one transaction:
    /// settle each liker's profile `favorite_count` and the owner's
    /// `total_favorited`, remove the favorite edges and comments, then
    /// the video row and the owner's `work_count`. Counter floors apply
    /// throughout, so the cardinality invariants hold after deletion.
    pub async fn delete_video(&self, requester_id: i64, video_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Locked so no favorite edge can land while the cascade settles.
        let video = db::videos::lock_by_id(&mut tx, video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("video {}", video_id)))?;

        if video.user_id != requester_id {
            return Err(AppError::Forbidden(
                "only the video's owner may delete it".into(),
            ));
        }

        let removed_favorites = db::edges::drain_video_favorites(&mut tx, video_id).await?;
        db::counters::decr_total_favorited_by(&mut tx, video.user_id, removed_favorites).await?;

        db::comments::delete_video_comments(&mut tx, video_id).await?;

        let deleted = db::videos::delete_video_row(&mut tx, video_id).await?;
        if !deleted {
            return Err(AppError::NoOp(format!("video {} already gone", video_id)));
        }
        db::counters::decr_work_count(&mut tx, video.user_id).await?;

        tx.commit().await?;
        debug!(requester_id, video_id, removed_favorites, "video deleted");
        Ok(())
    }
}
