//! Integration tests against a real PostgreSQL instance.
//!
//! All tests are ignored by default; run them with a database available:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use reel_service::db;
use reel_service::error::AppError;
use reel_service::security::password::hash_password;
use reel_service::services::{EngagementService, MembershipResolver};

async fn setup_pool() -> PgPool {
    let url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

/// Usernames must be unique across runs that share one database.
async fn create_test_user(pool: &PgPool, tag: &str) -> i64 {
    let username = format!("{}{:08x}", tag, rand::random::<u32>());
    let hash = hash_password("test-password").expect("hashing should succeed");
    db::users::create_user(pool, &username, &hash)
        .await
        .expect("user creation should succeed")
        .id
}

async fn follow_count(pool: &PgPool, user_id: i64) -> (i64, i64) {
    let profile = db::users::get_profile(pool, user_id)
        .await
        .expect("profile query should succeed")
        .expect("profile should exist");
    (profile.follow_count, profile.follower_count)
}

async fn favorite_edge_count(pool: &PgPool, video_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites WHERE video_id = $1")
        .bind(video_id)
        .fetch_one(pool)
        .await
        .expect("count query should succeed")
}

async fn video_favorite_count(pool: &PgPool, video_id: i64) -> i64 {
    db::videos::find_by_id(pool, video_id)
        .await
        .expect("video query should succeed")
        .expect("video should exist")
        .favorite_count
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn favorite_count_matches_edge_cardinality() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "card_o").await;
    let liker = create_test_user(&pool, "card_l").await;
    let video = svc
        .publish_video(owner, "cardinality", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    svc.favorite(liker, video.id).await.expect("favorite should succeed");
    assert_eq!(video_favorite_count(&pool, video.id).await, 1);
    assert_eq!(favorite_edge_count(&pool, video.id).await, 1);

    svc.unfavorite(liker, video.id)
        .await
        .expect("unfavorite should succeed");
    assert_eq!(video_favorite_count(&pool, video.id).await, 0);
    assert_eq!(favorite_edge_count(&pool, video.id).await, 0);

    // Duplicate favorite is a conflict and moves nothing.
    svc.favorite(liker, video.id).await.expect("refavorite should succeed");
    let err = svc.favorite(liker, video.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(video_favorite_count(&pool, video.id).await, 1);
    assert_eq!(favorite_edge_count(&pool, video.id).await, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn unfollow_twice_is_noop_with_single_decrement() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let a = create_test_user(&pool, "idem_a").await;
    let b = create_test_user(&pool, "idem_b").await;

    svc.follow(a, b).await.expect("follow should succeed");
    svc.unfollow(a, b).await.expect("first unfollow should succeed");

    let err = svc.unfollow(a, b).await.unwrap_err();
    assert!(matches!(err, AppError::NoOp(_)));

    assert_eq!(follow_count(&pool, a).await.0, 0);
    assert_eq!(follow_count(&pool, b).await.1, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn floor_law_unfavorite_never_goes_negative() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "floor_o").await;
    let liker = create_test_user(&pool, "floor_l").await;
    let video = svc
        .publish_video(owner, "floor", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    svc.favorite(liker, video.id).await.expect("favorite should succeed");
    svc.unfavorite(liker, video.id)
        .await
        .expect("unfavorite should succeed");

    for _ in 0..3 {
        let err = svc.unfavorite(liker, video.id).await.unwrap_err();
        assert!(matches!(err, AppError::NoOp(_)));
    }

    assert_eq!(video_favorite_count(&pool, video.id).await, 0);
    let liker_profile = db::users::get_profile(&pool, liker).await.unwrap().unwrap();
    let owner_profile = db::users::get_profile(&pool, owner).await.unwrap().unwrap();
    assert_eq!(liker_profile.favorite_count, 0);
    assert_eq!(owner_profile.total_favorited, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn self_follow_rejected_without_state_change() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let a = create_test_user(&pool, "self_a").await;

    let err = svc.follow(a, a).await.unwrap_err();
    assert!(matches!(err, AppError::SelfAction(_)));

    let (follow, follower) = follow_count(&pool, a).await;
    assert_eq!(follow, 0);
    assert_eq!(follower, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn follow_scenario_list_and_counters() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());
    let resolver = MembershipResolver::new(pool.clone());

    let a = create_test_user(&pool, "scen_a").await;
    let b = create_test_user(&pool, "scen_b").await;

    svc.follow(a, b).await.expect("follow should succeed");

    let following = db::edges::following_of(&pool, a).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].id, b);
    let followed = resolver.followed_of(Some(a), &[b]).await.unwrap();
    assert!(followed.contains(&b));

    assert_eq!(follow_count(&pool, a).await.0, 1);
    assert_eq!(follow_count(&pool, b).await.1, 1);

    svc.unfollow(a, b).await.expect("unfollow should succeed");

    assert!(db::edges::following_of(&pool, a).await.unwrap().is_empty());
    assert_eq!(follow_count(&pool, a).await.0, 0);
    assert_eq!(follow_count(&pool, b).await.1, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn concurrent_favorites_both_count() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "conc_o").await;
    let liker_a = create_test_user(&pool, "conc_a").await;
    let liker_b = create_test_user(&pool, "conc_b").await;
    let video = svc
        .publish_video(owner, "concurrent", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    let svc_a = svc.clone();
    let svc_b = svc.clone();
    let (ra, rb) = tokio::join!(
        svc_a.favorite(liker_a, video.id),
        svc_b.favorite(liker_b, video.id),
    );
    ra.expect("first concurrent favorite should succeed");
    rb.expect("second concurrent favorite should succeed");

    assert_eq!(video_favorite_count(&pool, video.id).await, 2);
    assert_eq!(favorite_edge_count(&pool, video.id).await, 2);

    let owner_profile = db::users::get_profile(&pool, owner).await.unwrap().unwrap();
    assert_eq!(owner_profile.total_favorited, 2);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn concurrent_favorite_and_unfavorite_single_delta() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "race_o").await;
    let liker = create_test_user(&pool, "race_l").await;
    let video = svc
        .publish_video(owner, "race", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    // The unique (user, video) pair arbitrates: whichever interleaving
    // occurs, only the side that actually mutated the edge moves the
    // counters, so counter and cardinality agree afterwards.
    let svc_f = svc.clone();
    let svc_u = svc.clone();
    let (rf, ru) = tokio::join!(
        svc_f.favorite(liker, video.id),
        svc_u.unfavorite(liker, video.id),
    );
    rf.expect("favorite should succeed");
    let edges = favorite_edge_count(&pool, video.id).await;
    match ru {
        // Unfavorite saw the committed edge and removed it.
        Ok(()) => assert_eq!(edges, 0),
        // Unfavorite found nothing to delete; the edge survives.
        Err(AppError::NoOp(_)) => assert_eq!(edges, 1),
        Err(other) => panic!("unexpected unfavorite outcome: {other}"),
    }

    assert_eq!(video_favorite_count(&pool, video.id).await, edges);
    let liker_profile = db::users::get_profile(&pool, liker).await.unwrap().unwrap();
    let owner_profile = db::users::get_profile(&pool, owner).await.unwrap().unwrap();
    assert_eq!(liker_profile.favorite_count, edges);
    assert_eq!(owner_profile.total_favorited, edges);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn mutual_follows_do_not_deadlock() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let a = create_test_user(&pool, "mutl_a").await;
    let b = create_test_user(&pool, "mutl_b").await;

    // Both directions at once touch the same two profile rows; a lock
    // ordering mismatch would abort one side.
    let svc_a = svc.clone();
    let svc_b = svc.clone();
    let (ra, rb) = tokio::join!(svc_a.follow(a, b), svc_b.follow(b, a));
    ra.expect("a -> b follow should succeed");
    rb.expect("b -> a follow should succeed");

    assert_eq!(follow_count(&pool, a).await, (1, 1));
    assert_eq!(follow_count(&pool, b).await, (1, 1));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn comment_moves_comment_count_only() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "cmnt_o").await;
    let commenter = create_test_user(&pool, "cmnt_c").await;
    let video = svc
        .publish_video(owner, "comments", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    let comment = svc
        .comment(commenter, video.id, "nice one")
        .await
        .expect("comment should succeed");

    let after = db::videos::find_by_id(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(after.comment_count, 1);
    assert_eq!(after.favorite_count, 0);

    // Only the author may delete.
    let err = svc.delete_comment(owner, comment.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    svc.delete_comment(commenter, comment.id)
        .await
        .expect("author delete should succeed");
    let after = db::videos::find_by_id(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(after.comment_count, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn delete_video_cascade_settles_counters() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "casc_o").await;
    let liker = create_test_user(&pool, "casc_l").await;
    let video = svc
        .publish_video(owner, "cascade", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    svc.favorite(liker, video.id).await.expect("favorite should succeed");
    svc.comment(liker, video.id, "soon gone")
        .await
        .expect("comment should succeed");

    // Only the owner may delete.
    let err = svc.delete_video(liker, video.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    svc.delete_video(owner, video.id)
        .await
        .expect("owner delete should succeed");

    assert!(db::videos::find_by_id(&pool, video.id).await.unwrap().is_none());
    assert_eq!(favorite_edge_count(&pool, video.id).await, 0);

    let owner_profile = db::users::get_profile(&pool, owner).await.unwrap().unwrap();
    let liker_profile = db::users::get_profile(&pool, liker).await.unwrap().unwrap();
    assert_eq!(owner_profile.work_count, 0);
    assert_eq!(owner_profile.total_favorited, 0);
    assert_eq!(liker_profile.favorite_count, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn favorite_racing_video_delete_leaves_no_counter_drift() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "drft_o").await;
    let liker = create_test_user(&pool, "drft_l").await;
    let video = svc
        .publish_video(owner, "drift", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    // The favorite either lands before the delete locks the video row
    // (and the cascade drains it, settling the liker's counter in the
    // same statement), or it loses and rolls back entirely. Either way
    // no profile may end up counting an edge that no longer exists.
    let svc_d = svc.clone();
    let svc_f = svc.clone();
    let (rd, _rf) = tokio::join!(
        svc_d.delete_video(owner, video.id),
        svc_f.favorite(liker, video.id),
    );
    rd.expect("owner delete should succeed");

    assert!(db::videos::find_by_id(&pool, video.id).await.unwrap().is_none());
    assert_eq!(favorite_edge_count(&pool, video.id).await, 0);

    let liker_profile = db::users::get_profile(&pool, liker).await.unwrap().unwrap();
    let owner_profile = db::users::get_profile(&pool, owner).await.unwrap().unwrap();
    assert_eq!(liker_profile.favorite_count, 0);
    assert_eq!(owner_profile.total_favorited, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn publish_time_is_millisecond_aligned() {
    let pool = setup_pool().await;
    let svc = EngagementService::new(pool.clone());

    let owner = create_test_user(&pool, "msal_o").await;
    let video = svc
        .publish_video(owner, "aligned", "https://m/p.mp4", "https://m/c.jpg")
        .await
        .expect("publish should succeed");

    // The stored instant must round-trip through the millisecond cursor
    // unit exactly, or two videos inside one millisecond could slip
    // between pages.
    let stored = db::videos::find_by_id(&pool, video.id)
        .await
        .unwrap()
        .unwrap()
        .publish_time;
    let round_tripped =
        chrono::DateTime::<Utc>::from_timestamp_millis(stored.timestamp_millis()).unwrap();
    assert_eq!(stored, round_tripped);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn feed_pages_have_no_overlap_and_no_gap() {
    let pool = setup_pool().await;
    let owner = create_test_user(&pool, "feed_o").await;

    // Publish times far in the future so rows from other tests (all at
    // NOW()) stay out of the pages under inspection. Millisecond-aligned
    // so the values survive the store's microsecond precision intact.
    let base = chrono::DateTime::<Utc>::from_timestamp_millis(Utc::now().timestamp_millis())
        .unwrap()
        + Duration::days(1000);
    let mut ids = Vec::new();
    for i in 0..12 {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO videos (user_id, title, play_url, cover_url, publish_time)
            VALUES ($1, $2, 'https://m/p.mp4', 'https://m/c.jpg', $3)
            RETURNING id
            "#,
        )
        .bind(owner)
        .bind(format!("feed {}", i))
        .bind(base + Duration::seconds(i))
        .fetch_one(&pool)
        .await
        .expect("insert should succeed");
        ids.push(id);
    }

    // Newest first: ids[11], ids[10], ...
    let first = db::videos::feed_page(&pool, base + Duration::seconds(13), 5)
        .await
        .expect("first page should load");
    let first_ids: Vec<i64> = first.iter().map(|v| v.id).collect();
    assert_eq!(first_ids, vec![ids[11], ids[10], ids[9], ids[8], ids[7]]);

    let cursor = first.last().unwrap().publish_time;
    assert_eq!(cursor, base + Duration::seconds(7));

    let second = db::videos::feed_page(&pool, cursor, 5)
        .await
        .expect("second page should load");
    let second_ids: Vec<i64> = second.iter().map(|v| v.id).collect();
    assert_eq!(second_ids, vec![ids[6], ids[5], ids[4], ids[3], ids[2]]);

    let third = db::videos::feed_page(&pool, second.last().unwrap().publish_time, 5)
        .await
        .expect("third page should load");
    // The remaining two of ours lead the third page; anything after them
    // belongs to other tests' rows published at NOW().
    assert_eq!(third[0].id, ids[1]);
    assert_eq!(third[1].id, ids[0]);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn anonymous_membership_resolves_empty_without_query() {
    let pool = setup_pool().await;
    let resolver = MembershipResolver::new(pool.clone());

    let favorited = resolver.favorited_of(None, &[1, 2, 3]).await.unwrap();
    let followed = resolver.followed_of(None, &[1, 2, 3]).await.unwrap();
    assert!(favorited.is_empty());
    assert!(followed.is_empty());
}
