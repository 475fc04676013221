//! Full-loop test: the client store driving a real server instance over
//! HTTP, exercising the optimistic paths against actual persistence.

mod common;

use actix_web::{App, web};

use threadboard::client::agent;
use threadboard::client::api::{ApiError, RestApi};
use threadboard::client::ledger::VoteLedger;
use threadboard::client::store::{ForumStore, StoreError};
use threadboard::handlers;
use threadboard::models::tag;
use threadboard::models::thread::{ThreadStatus, VoteDirection};

#[actix_rt::test]
async fn test_store_against_live_server() {
    let (_dir, pool) = common::setup_test_db();
    let srv = actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(handlers::configure)
    });

    let api = RestApi::new(format!("http://{}", srv.addr()));
    let moderator = agent::authenticate("CO-000000002").unwrap();
    let store = ForumStore::new(api, moderator, VoteLedger::in_memory());

    store.refresh().await.unwrap();
    assert!(store.threads().is_empty());

    // Create, then confirm the server assigned the identifier.
    let created = store
        .create_thread("Deployment question", "How do we ship this?", vec![
            tag::by_id(5).unwrap(),
        ])
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.author, "Jane Smith");
    assert_eq!(created.tags[0].name, "Question");
    let id = created.id;

    // First vote is a single step.
    store.vote(id, VoteDirection::Up).await.unwrap();
    assert_eq!(store.thread(id).unwrap().votes, 1);

    // Idempotent repeat: no change.
    store.vote(id, VoteDirection::Up).await.unwrap();
    assert_eq!(store.thread(id).unwrap().votes, 1);

    // Switch: undo-then-apply pair lands at -1.
    store.vote(id, VoteDirection::Down).await.unwrap();
    assert_eq!(store.thread(id).unwrap().votes, -1);
    assert_eq!(store.vote_of(id), Some(VoteDirection::Down));

    // Comment: the placeholder must be gone after confirmation.
    store.add_comment(id, "Shipping on Friday").await.unwrap();
    let thread = store.thread(id).unwrap();
    assert_eq!(thread.comments.len(), 1);
    assert!(thread.comments[0].id > 0);

    // Moderation: lock, then commenting refuses locally.
    store.set_status(id, ThreadStatus::Locked).await.unwrap();
    assert_eq!(store.thread(id).unwrap().status, ThreadStatus::Locked);
    assert!(matches!(
        store.add_comment(id, "one more").await,
        Err(StoreError::ThreadLocked)
    ));

    // Fresh store sees the persisted state.
    let api = RestApi::new(format!("http://{}", srv.addr()));
    let viewer = agent::authenticate("CO-000000003").unwrap();
    let other = ForumStore::new(api, viewer, VoteLedger::in_memory());
    other.refresh().await.unwrap();
    let seen = other.thread(id).unwrap();
    assert_eq!(seen.votes, -1);
    assert_eq!(seen.comments.len(), 1);
    assert_eq!(seen.status, ThreadStatus::Locked);

    // Delete, then the thread is gone on the wire too.
    store.delete_thread(id).await.unwrap();
    assert!(store.thread(id).is_none());
    other.refresh().await.unwrap();
    assert!(other.thread(id).is_none());
}

#[actix_rt::test]
async fn test_rest_api_error_mapping() {
    let (_dir, pool) = common::setup_test_db();
    let srv = actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(handlers::configure)
    });
    let api = RestApi::new(format!("http://{}", srv.addr()));

    use threadboard::client::api::ThreadApi;
    match api.get_thread(999).await {
        Err(ApiError::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }

    let bad = threadboard::models::thread::NewThread {
        title: "  ".to_string(),
        content: "x".to_string(),
        ..Default::default()
    };
    match api.create_thread(&bad).await {
        Err(ApiError::Validation(msg)) => assert_eq!(msg, "Title is required"),
        other => panic!("expected Validation, got {other:?}"),
    }
}
