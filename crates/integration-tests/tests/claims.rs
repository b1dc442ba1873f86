//! Claim transaction tests.
//!
//! Require a migrated `PostgreSQL` database at `TEST_DATABASE_URL`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use futures::future::join_all;

use prompt_market_core::claim::ClaimError;
use prompt_market_core::{Credits, PromptId, SubscriptionTier};
use prompt_market_integration_tests::{
    create_prompt, create_user, profile, set_profile, test_pool, unique_email,
};
use prompt_market_server::db::claims::ClaimRepository;
use prompt_market_server::db::users::UserRepository;

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_claim_debits_once_and_rejects_repeat() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let prompt = create_prompt(&pool, 3).await;
    let claims = ClaimRepository::new(&pool);

    let receipt = claims
        .claim(user.id, &user.email, prompt.id())
        .await
        .expect("first claim succeeds");
    assert_eq!(receipt.charged, Credits::new(3));
    assert_eq!(receipt.balance_after, Credits::new(7));

    let second = claims.claim(user.id, &user.email, prompt.id()).await;
    assert_eq!(second, Err(ClaimError::AlreadyClaimed));

    assert_eq!(profile(&pool, &user).await.credit_balance, Credits::new(7));
    assert!(claims.is_claimed(user.id, prompt.id()).await.unwrap());

    let owned = claims.list_for_user(user.id).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].prompt.prompt_text, "secret prompt text");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_insufficient_credits_changes_nothing() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    set_profile(&pool, &user, 1, SubscriptionTier::Free).await;
    let prompt = create_prompt(&pool, 3).await;
    let claims = ClaimRepository::new(&pool);

    let result = claims.claim(user.id, &user.email, prompt.id()).await;
    assert_eq!(
        result,
        Err(ClaimError::InsufficientCredits {
            required: Credits::new(3),
            available: Credits::new(1),
        })
    );

    assert_eq!(profile(&pool, &user).await.credit_balance, Credits::new(1));
    assert!(!claims.is_claimed(user.id, prompt.id()).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_unlimited_tier_claims_for_free() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    set_profile(&pool, &user, 0, SubscriptionTier::Unlimited).await;
    let prompt = create_prompt(&pool, 5).await;

    let receipt = ClaimRepository::new(&pool)
        .claim(user.id, &user.email, prompt.id())
        .await
        .expect("unlimited claim succeeds");

    assert_eq!(receipt.charged, Credits::ZERO);
    assert_eq!(receipt.balance_after, Credits::ZERO);
    assert_eq!(profile(&pool, &user).await.credit_balance, Credits::ZERO);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_missing_prompt() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;

    let result = ClaimRepository::new(&pool)
        .claim(user.id, &user.email, PromptId::generate())
        .await;
    assert_eq!(result, Err(ClaimError::PromptNotFound));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_first_claim_creates_profile() {
    let pool = test_pool().await;
    let user = UserRepository::new(&pool)
        .create_with_password(&unique_email(), "not-a-real-hash")
        .await
        .unwrap();
    let prompt = create_prompt(&pool, 4).await;

    let receipt = ClaimRepository::new(&pool)
        .claim(user.id, &user.email, prompt.id())
        .await
        .expect("claim seeds the default profile");

    assert_eq!(receipt.balance_after, Credits::new(6));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_concurrent_claims_of_same_prompt() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let prompt = create_prompt(&pool, 3).await;

    let handles = (0..8).map(|_| {
        let pool = pool.clone();
        let email = user.email.clone();
        let (user_id, prompt_id) = (user.id, prompt.id());
        tokio::spawn(async move {
            ClaimRepository::new(&pool)
                .claim(user_id, &email, prompt_id)
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
            .all(|e| *e == ClaimError::AlreadyClaimed)
    );
    assert_eq!(profile(&pool, &user).await.credit_balance, Credits::new(7));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_concurrent_claims_never_overspend() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;

    // 10 credits buy three of these, not five
    let mut prompts = Vec::new();
    for _ in 0..5 {
        prompts.push(create_prompt(&pool, 3).await);
    }

    let handles = prompts.iter().map(|prompt| {
        let pool = pool.clone();
        let email = user.email.clone();
        let (user_id, prompt_id) = (user.id, prompt.id());
        tokio::spawn(async move {
            ClaimRepository::new(&pool)
                .claim(user_id, &email, prompt_id)
                .await
        })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ClaimError::InsufficientCredits { .. }))
    );
    assert_eq!(profile(&pool, &user).await.credit_balance, Credits::new(1));
}
