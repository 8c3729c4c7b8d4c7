/// Counter ledger: relative updates evaluated by the store.
///
/// Increments are unconditional `count + 1`; decrements are floored with
/// `GREATEST(count - 1, 0)` so a surplus or concurrent decrement can never
/// drive a counter negative. Every function runs on the engagement
/// coordinator's transaction; there is no path that adjusts a counter
/// outside one.
use sqlx::PgConnection;

pub async fn incr_follow_count(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_profiles SET follow_count = follow_count + 1 WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn decr_follow_count(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_profiles SET follow_count = GREATEST(follow_count - 1, 0) WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn incr_follower_count(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_profiles SET follower_count = follower_count + 1 WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn decr_follower_count(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_profiles SET follower_count = GREATEST(follower_count - 1, 0) WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// The liker's own profile favorite count.
pub async fn incr_profile_favorite_count(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_profiles SET favorite_count = favorite_count + 1 WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn decr_profile_favorite_count(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_profiles SET favorite_count = GREATEST(favorite_count - 1, 0) WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// The video owner's received-favorites total.
pub async fn incr_total_favorited(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_profiles SET total_favorited = total_favorited + 1 WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn decr_total_favorited(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_profiles SET total_favorited = GREATEST(total_favorited - 1, 0) WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Floored bulk decrement, used when a video-delete cascade removes
/// several favorite edges at once.
pub async fn decr_total_favorited_by(
    conn: &mut PgConnection,
    user_id: i64,
    amount: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_profiles SET total_favorited = GREATEST(total_favorited - $2, 0) WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn incr_work_count(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_profiles SET work_count = work_count + 1 WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn decr_work_count(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_profiles SET work_count = GREATEST(work_count - 1, 0) WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn incr_video_favorite_count(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE videos SET favorite_count = favorite_count + 1 WHERE id = $1")
        .bind(video_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn decr_video_favorite_count(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE videos SET favorite_count = GREATEST(favorite_count - 1, 0) WHERE id = $1")
        .bind(video_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn incr_video_comment_count(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE videos SET comment_count = comment_count + 1 WHERE id = $1")
        .bind(video_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn decr_video_comment_count(
    conn: &mut PgConnection,
    video_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE videos SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = $1")
        .bind(video_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
