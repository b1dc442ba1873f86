//! Email/password and external-identity sign-in tests.
//!
//! Require a migrated `PostgreSQL` database at `TEST_DATABASE_URL`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use prompt_market_integration_tests::{test_pool, unique_email};
use prompt_market_server::db::users::UserRepository;
use prompt_market_server::services::auth::{AuthError, AuthService};
use prompt_market_server::services::google::PROVIDER;

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_sign_up_then_sign_in() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);
    let email = unique_email();

    let created = auth.sign_up(email.as_str(), "hunter22").await.unwrap();
    assert_eq!(created.email, email);

    let signed_in = auth.sign_in(email.as_str(), "hunter22").await.unwrap();
    assert_eq!(signed_in.id, created.id);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_bad_credentials_are_indistinguishable() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);
    let email = unique_email();
    auth.sign_up(email.as_str(), "hunter22").await.unwrap();

    let wrong_password = auth.sign_in(email.as_str(), "hunter23").await;
    assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

    let unknown = unique_email();
    let unknown_email = auth.sign_in(unknown.as_str(), "hunter22").await;
    assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_duplicate_sign_up_rejected() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);
    let email = unique_email();

    auth.sign_up(email.as_str(), "hunter22").await.unwrap();
    let again = auth.sign_up(email.as_str(), "different1").await;
    assert!(matches!(again, Err(AuthError::UserAlreadyExists)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_identity_links_to_existing_account() {
    let pool = test_pool().await;
    let email = unique_email();
    let existing = AuthService::new(&pool)
        .sign_up(email.as_str(), "hunter22")
        .await
        .unwrap();

    let subject = format!("google-{}", uuid::Uuid::new_v4());
    let users = UserRepository::new(&pool);

    let linked = users
        .find_or_create_by_identity(PROVIDER, &subject, &email)
        .await
        .unwrap();
    assert_eq!(linked.id, existing.id);

    let again = users
        .find_or_create_by_identity(PROVIDER, &subject, &email)
        .await
        .unwrap();
    assert_eq!(again.id, existing.id);

    // Password sign-in still works after linking
    let signed_in = AuthService::new(&pool)
        .sign_in(email.as_str(), "hunter22")
        .await
        .unwrap();
    assert_eq!(signed_in.id, existing.id);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_identity_creates_account_for_new_email() {
    let pool = test_pool().await;
    let email = unique_email();
    let subject = format!("google-{}", uuid::Uuid::new_v4());

    let user = AuthService::new(&pool)
        .sign_in_with_identity(PROVIDER, &subject, &email)
        .await
        .unwrap();
    assert_eq!(user.email, email);

    // No password row, so password sign-in is refused
    let password = AuthService::new(&pool)
        .sign_in(email.as_str(), "hunter22")
        .await;
    assert!(matches!(password, Err(AuthError::InvalidCredentials)));
}
