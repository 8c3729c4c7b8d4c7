/// Membership resolver: batch "does the viewer have an edge to X" checks
/// for feed and list annotation.
///
/// Exactly one query per call regardless of batch size; an anonymous
/// viewer or an empty batch resolves to the empty set without touching
/// the store.
use std::collections::HashSet;

use sqlx::PgPool;

use crate::error::Result;

#[derive(Clone)]
pub struct MembershipResolver {
    pool: PgPool,
}

impl MembershipResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Which of `video_ids` the viewer has favorited.
    pub async fn favorited_of(
        &self,
        viewer_id: Option<i64>,
        video_ids: &[i64],
    ) -> Result<HashSet<i64>> {
        let Some(viewer_id) = viewer_id else {
            return Ok(HashSet::new());
        };
        if video_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT video_id FROM favorites WHERE user_id = $1 AND video_id = ANY($2)",
        )
        .bind(viewer_id)
        .bind(video_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// Which of `user_ids` the viewer follows.
    pub async fn followed_of(
        &self,
        viewer_id: Option<i64>,
        user_ids: &[i64],
    ) -> Result<HashSet<i64>> {
        let Some(viewer_id) = viewer_id else {
            return Ok(HashSet::new());
        };
        if user_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT to_user_id FROM relations WHERE from_user_id = $1 AND to_user_id = ANY($2)",
        )
        .bind(viewer_id)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
