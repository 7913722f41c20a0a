//! Review queue and grading API tests.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;
use uuid::Uuid;

use common::{find_collection, find_verse, fixtures, ids, TestContext};

fn entry_ids(queue: &Value) -> Vec<Uuid> {
    queue["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["verse_id"].as_str().unwrap().parse().unwrap())
        .collect()
}

async fn grade(ctx: &TestContext, token: &str, verse_id: Uuid, grade: Option<u8>) -> Value {
    let response = ctx
        .post("/api/review/grade", token)
        .json(&fixtures::grade_request(verse_id, grade))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_queue_empty_library() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;

    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::queue_request(fixtures::library_scope(), "due_first"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "nothing_eligible");
}

#[tokio::test]
async fn test_queue_library_due_first() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let mut added = ids(&ctx.add_verses(&token, 3, &[]).await);

    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::queue_request(fixtures::library_scope(), "due_first"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["mode"], "due_first");
    assert_eq!(body["config"]["cloze_rate"], 30);

    let mut queued = entry_ids(&body);
    queued.sort();
    added.sort();
    assert_eq!(queued, added);
    for entry in body["entries"].as_array().unwrap() {
        assert_eq!(entry["auto_grade"], true);
        assert_eq!(entry["learning_phase"], "beginner");
    }
}

#[tokio::test]
async fn test_queue_excludes_queued_verses() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let collection_id = ctx.create_collection(&token, "Drip").await;
    ctx.enable_daily_drip(&token, collection_id, 1).await;
    let verse_ids = ids(&ctx.add_verses(&token, 3, &[collection_id]).await);

    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::queue_request(
            fixtures::collection_scope(collection_id),
            "random",
        ))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(entry_ids(&body), vec![verse_ids[0]]);
}

#[tokio::test]
async fn test_queue_sequential_follows_collection_order() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let collection_id = ctx.create_collection(&token, "Ordered").await;
    let verse_ids = ids(&ctx.add_verses(&token, 4, &[collection_id]).await);

    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::queue_request(
            fixtures::collection_scope(collection_id),
            "sequential",
        ))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"], "sequential");
    assert_eq!(entry_ids(&body), verse_ids);
}

#[tokio::test]
async fn test_queue_starred_scope() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_ids = ids(&ctx.add_verses(&token, 3, &[]).await);

    let empty = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::queue_request(fixtures::starred_scope(), "random"))
        .await;
    let body: Value = empty.json();
    assert_eq!(body["status"], "nothing_eligible");

    ctx.put(&format!("/api/verses/{}/star", verse_ids[1]), &token)
        .json(&serde_json::json!({ "starred": true }))
        .await
        .assert_status_ok();

    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::queue_request(fixtures::starred_scope(), "random"))
        .await;
    let body: Value = response.json();
    assert_eq!(entry_ids(&body), vec![verse_ids[1]]);
}

#[tokio::test]
async fn test_queue_continue_from() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let collection_id = ctx.create_collection(&token, "Walk").await;
    let verse_ids = ids(&ctx.add_verses(&token, 4, &[collection_id]).await);

    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::continue_request(collection_id, verse_ids[1]))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"], "sequential");
    assert_eq!(entry_ids(&body), verse_ids[1..].to_vec());
}

#[tokio::test]
async fn test_queue_pinned_unknown_verse() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    ctx.add_verses(&token, 1, &[]).await;

    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::pinned_request(Uuid::new_v4()))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "nothing_eligible");
}

#[tokio::test]
async fn test_beginner_is_auto_graded() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_id = ids(&ctx.add_verses(&token, 1, &[]).await)[0];

    let body = grade(&ctx, &token, verse_id, None).await;

    assert_eq!(body["auto_graded"], true);
    assert_eq!(body["grade"], 3);
    assert_eq!(body["xp_earned"], 15);
    assert_eq!(body["total_xp"], 15);
    assert_eq!(body["streak"], 1);
    assert_eq!(body["learning_phase"], "learning");
    assert!(body["activated"].as_array().unwrap().is_empty());

    let library = ctx.library(&token).await;
    assert_eq!(find_verse(&library, verse_id)["learning_phase"], "learning");
    assert_eq!(library["profile"]["total_reviewed"], 1);
}

#[tokio::test]
async fn test_learning_verse_requires_grade() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_id = ids(&ctx.add_verses(&token, 1, &[]).await)[0];
    grade(&ctx, &token, verse_id, None).await;

    let response = ctx
        .post("/api/review/grade", &token)
        .json(&fixtures::grade_request(verse_id, None))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_passing_grade_masters_learning_verse() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_id = ids(&ctx.add_verses(&token, 1, &[]).await)[0];
    grade(&ctx, &token, verse_id, None).await;

    let failed = grade(&ctx, &token, verse_id, Some(1)).await;
    assert_eq!(failed["learning_phase"], "learning");

    let passed = grade(&ctx, &token, verse_id, Some(3)).await;
    assert_eq!(passed["learning_phase"], "mastered");

    let again = grade(&ctx, &token, verse_id, Some(1)).await;
    assert_eq!(again["learning_phase"], "mastered");
}

#[tokio::test]
async fn test_same_day_reviews_earn_diminished_xp() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_id = ids(&ctx.add_verses(&token, 1, &[]).await)[0];

    let first = grade(&ctx, &token, verse_id, None).await;
    assert_eq!(first["xp_earned"], 15);

    let repeat = grade(&ctx, &token, verse_id, Some(3)).await;
    assert_eq!(repeat["xp_earned"], 7);

    // A better grade tops up to the new base.
    let better = grade(&ctx, &token, verse_id, Some(4)).await;
    assert_eq!(better["xp_earned"], 5);
    assert_eq!(better["total_xp"], 27);

    // Next day starts fresh.
    ctx.advance_days(1);
    let next_day = grade(&ctx, &token, verse_id, Some(3)).await;
    assert_eq!(next_day["xp_earned"], 15);
    assert_eq!(next_day["streak"], 2);
}

#[tokio::test]
async fn test_streak_resets_after_missed_day() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_ids = ids(&ctx.add_verses(&token, 3, &[]).await);

    assert_eq!(grade(&ctx, &token, verse_ids[0], None).await["streak"], 1);
    ctx.advance_days(1);
    assert_eq!(grade(&ctx, &token, verse_ids[1], None).await["streak"], 2);
    ctx.advance_days(2);
    assert_eq!(grade(&ctx, &token, verse_ids[2], None).await["streak"], 1);
}

#[tokio::test]
async fn test_invalid_grade() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_id = ids(&ctx.add_verses(&token, 1, &[]).await)[0];

    let response = ctx
        .post("/api/review/grade", &token)
        .json(&fixtures::grade_request(verse_id, Some(9)))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_grade_unknown_verse() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;

    let response = ctx
        .post("/api/review/grade", &token)
        .json(&fixtures::grade_request(Uuid::new_v4(), Some(3)))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reviewing_queued_verse_catches_up_drip() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let collection_id = ctx.create_collection(&token, "Catch-up").await;
    ctx.enable_daily_drip(&token, collection_id, 1).await;
    let verse_ids = ids(&ctx.add_verses(&token, 4, &[collection_id]).await);

    // Pinning reaches a verse the drip has not unlocked yet.
    let response = ctx
        .post("/api/review/queue", &token)
        .json(&fixtures::pinned_request(verse_ids[3]))
        .await;
    let queue: Value = response.json();
    assert_eq!(entry_ids(&queue), vec![verse_ids[3]]);

    let body = grade(&ctx, &token, verse_ids[3], None).await;
    let activated: Vec<Uuid> = body["activated"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(activated, vec![verse_ids[3], verse_ids[1]]);

    let library = ctx.library(&token).await;
    assert_eq!(find_collection(&library, collection_id)["drip_cursor"], 2);
    assert_eq!(find_verse(&library, verse_ids[2])["active"], false);
    assert_eq!(library["stats"]["queued"], 1);
}

#[tokio::test]
async fn test_store_failure_leaves_state_untouched() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let verse_id = ids(&ctx.add_verses(&token, 1, &[]).await)[0];

    ctx.store.set_fail_writes(true);
    let response = ctx
        .post("/api/review/grade", &token)
        .json(&fixtures::grade_request(verse_id, None))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "store_unavailable");
    ctx.store.set_fail_writes(false);

    let library = ctx.library(&token).await;
    assert_eq!(find_verse(&library, verse_id)["learning_phase"], "beginner");
    assert_eq!(library["profile"]["xp"], 0);
    assert_eq!(library["profile"]["total_reviewed"], 0);
}
