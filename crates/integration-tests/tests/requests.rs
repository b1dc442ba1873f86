//! Weekly prompt-request throttle tests.
//!
//! Require a migrated `PostgreSQL` database at `TEST_DATABASE_URL`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Duration, Utc};
use futures::future::join_all;

use prompt_market_core::RequestStatus;
use prompt_market_core::requests::{RequestDetails, RequestError};
use prompt_market_integration_tests::{create_prompt, create_user, test_pool};
use prompt_market_server::db::requests::RequestRepository;

fn details(text: &str) -> RequestDetails {
    RequestDetails::parse(text).expect("valid details")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_second_pending_request_in_window_is_rejected() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let requests = RequestRepository::new(&pool);
    let now = Utc::now();

    let first = requests
        .submit(user.id, &user.email, &details("A logo prompt"), now)
        .await
        .expect("first request accepted");
    assert_eq!(first.status, RequestStatus::Pending);

    let second = requests
        .submit(
            user.id,
            &user.email,
            &details("Another one"),
            now + Duration::days(2),
        )
        .await;
    assert!(matches!(second, Err(RequestError::LimitReached { .. })));

    assert_eq!(requests.list_for_user(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_request_no_longer_pending_frees_the_slot() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let requests = RequestRepository::new(&pool);

    let first = requests
        .submit(user.id, &user.email, &details("A logo prompt"), Utc::now())
        .await
        .unwrap();

    requests
        .update_status(first.id, RequestStatus::InProgress, None)
        .await
        .unwrap();

    requests
        .submit(user.id, &user.email, &details("Next idea"), Utc::now())
        .await
        .expect("slot is free once the first request is in progress");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_pending_request_expires_after_a_week() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let requests = RequestRepository::new(&pool);
    let now = Utc::now();

    requests
        .submit(
            user.id,
            &user.email,
            &details("Old idea"),
            now - Duration::days(8),
        )
        .await
        .unwrap();

    requests
        .submit(user.id, &user.email, &details("New idea"), now)
        .await
        .expect("pending request older than a week does not block");

    let mine = requests.list_for_user(user.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].request_details, "New idea");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_concurrent_submissions_admit_one() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;

    let handles = (0..5).map(|i| {
        let pool = pool.clone();
        let email = user.email.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            RequestRepository::new(&pool)
                .submit(user_id, &email, &details(&format!("Idea {i}")), Utc::now())
                .await
        })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, RequestError::LimitReached { .. }))
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_leaving_completed_clears_linked_prompt() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let prompt = create_prompt(&pool, 2).await;
    let requests = RequestRepository::new(&pool);

    let request = requests
        .submit(user.id, &user.email, &details("A logo prompt"), Utc::now())
        .await
        .unwrap();

    let completed = requests
        .update_status(request.id, RequestStatus::Completed, Some(prompt.id()))
        .await
        .unwrap();
    assert_eq!(completed.completed_prompt_id, Some(prompt.id()));

    let reopened = requests
        .update_status(request.id, RequestStatus::Pending, None)
        .await
        .unwrap();
    assert_eq!(reopened.status, RequestStatus::Pending);
    assert_eq!(reopened.completed_prompt_id, None);

    // A prompt link sent with a non-completed status is not stored
    let in_progress = requests
        .update_status(request.id, RequestStatus::InProgress, Some(prompt.id()))
        .await
        .unwrap();
    assert_eq!(in_progress.completed_prompt_id, None);
}
