//! Integration tests for the idempotent write protocol.
//!
//! Exercises create-or-fetch semantics for dreams and segments against
//! a real database, including concurrent duplicate submission: exactly
//! one row per identifier, and no caller ever observes a conflict.

use assert_matches::assert_matches;
use sqlx::PgPool;
use uuid::Uuid;

use campfire_db::models::dream::CreateDream;
use campfire_db::models::segment::CreateSegment;
use campfire_db::repositories::{CreateOutcome, DreamRepo, SegmentRepo};

fn new_dream(id: Option<Uuid>, title: &str) -> CreateDream {
    CreateDream {
        id,
        title: title.to_string(),
    }
}

fn new_segment(id: Uuid, order: i32) -> CreateSegment {
    CreateSegment {
        id,
        filename: Some(format!("clip_{order}.m4a")),
        duration: 10.0,
        sort_order: order,
        storage_key: format!("dreams/test/clip_{order}.m4a"),
    }
}

async fn dream_count(pool: &PgPool, id: Uuid) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dreams WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

async fn segment_count(pool: &PgPool, id: Uuid) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM segments WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[sqlx::test(migrations = "./migrations")]
async fn dream_create_without_id_generates_one(pool: PgPool) {
    let outcome = DreamRepo::create_idempotent(&pool, &new_dream(None, "Fresh"))
        .await
        .unwrap();
    assert_matches!(outcome, CreateOutcome::Created(_));
    let dream = outcome.into_inner();
    assert_eq!(dream.title, "Fresh");
    assert_eq!(dream_count(&pool, dream.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn dream_create_replay_returns_existing_row(pool: PgPool) {
    let id = Uuid::new_v4();

    let first = DreamRepo::create_idempotent(&pool, &new_dream(Some(id), "Original"))
        .await
        .unwrap();
    assert_matches!(first, CreateOutcome::Created(_));

    // Retried create, even with a different title: existing row wins.
    let second = DreamRepo::create_idempotent(&pool, &new_dream(Some(id), "Retry"))
        .await
        .unwrap();
    assert_matches!(second, CreateOutcome::AlreadyExists(_));
    let dream = second.into_inner();
    assert_eq!(dream.id, id);
    assert_eq!(dream.title, "Original");
    assert_eq!(dream_count(&pool, id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_dream_creates_yield_one_row(pool: PgPool) {
    let id = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            DreamRepo::create_idempotent(&pool, &new_dream(Some(id), "Race")).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().expect("no caller may observe a conflict");
        if !outcome.already_existed() {
            created += 1;
        }
        assert_eq!(outcome.into_inner().id, id);
    }

    // First writer wins; the rest observe success against the same row.
    assert_eq!(created, 1);
    assert_eq!(dream_count(&pool, id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn segment_create_replay_returns_existing_row(pool: PgPool) {
    let dream = DreamRepo::create_idempotent(&pool, &new_dream(None, "Host"))
        .await
        .unwrap()
        .into_inner();

    let seg_id = Uuid::new_v4();
    let first = SegmentRepo::create_idempotent(&pool, dream.id, &new_segment(seg_id, 0))
        .await
        .unwrap();
    assert_matches!(first, CreateOutcome::Created(_));

    let second = SegmentRepo::create_idempotent(&pool, dream.id, &new_segment(seg_id, 0))
        .await
        .unwrap();
    assert_matches!(second, CreateOutcome::AlreadyExists(_));
    assert_eq!(second.into_inner().id, seg_id);
    assert_eq!(segment_count(&pool, seg_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_segment_creates_yield_one_row(pool: PgPool) {
    let dream = DreamRepo::create_idempotent(&pool, &new_dream(None, "Host"))
        .await
        .unwrap()
        .into_inner();
    let seg_id = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let dream_id = dream.id;
        handles.push(tokio::spawn(async move {
            SegmentRepo::create_idempotent(&pool, dream_id, &new_segment(seg_id, 3)).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().expect("no caller may observe a conflict");
        if !outcome.already_existed() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(segment_count(&pool, seg_id).await, 1);
}
