//! Google sign-in client (OAuth 2.0 authorization code flow with PKCE).
//!
//! # OAuth Flow
//!
//! 1. Generate state and a PKCE verifier; store them in the session
//! 2. Redirect to [`GoogleOAuthClient::authorization_url`]
//! 3. Google redirects back with an authorization code
//! 4. Exchange the code (plus verifier) with [`GoogleOAuthClient::exchange_code`]
//! 5. Fetch the verified email with [`GoogleOAuthClient::userinfo`]

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use prompt_market_core::{Email, EmailError};

use crate::config::GoogleOAuthConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Identity provider name stored in `user_identities`.
pub const PROVIDER: &str = "google";

/// Errors from the Google OAuth flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Google sign-in is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Google account email is not verified")]
    UnverifiedEmail,

    #[error("Google account email is invalid: {0}")]
    InvalidEmail(#[from] EmailError),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

/// A verified Google identity.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Stable Google account ID.
    pub subject: String,
    pub email: Email,
}

/// Client for Google's OAuth endpoints.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    inner: Arc<GoogleOAuthClientInner>,
}

struct GoogleOAuthClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
}

impl GoogleOAuthClient {
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            inner: Arc::new(GoogleOAuthClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// Build the URL that starts the Google login.
    #[must_use]
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        pkce_verifier: &str,
    ) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email&\
            state={}&\
            code_challenge={}&\
            code_challenge_method=S256",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            pkce_challenge(pkce_verifier),
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::TokenExchange` if Google rejects the code.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        pkce_verifier: &str,
    ) -> Result<SecretString, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", pkce_verifier),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange(format!("{status}: {text}")));
        }

        let token: TokenResponse = response.json().await?;
        Ok(SecretString::from(token.access_token))
    }

    /// Fetch the signed-in account's verified identity.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::UnverifiedEmail` when Google does not vouch for
    /// the email.
    pub async fn userinfo(&self, access_token: &SecretString) -> Result<GoogleIdentity, OAuthError> {
        let info: UserInfoResponse = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = match info.email {
            Some(email) if info.email_verified => Email::parse(&email)?,
            _ => return Err(OAuthError::UnverifiedEmail),
        };

        Ok(GoogleIdentity {
            subject: info.sub,
            email,
        })
    }
}

/// Generate a random alphanumeric token for OAuth state or a PKCE verifier.
#[must_use]
pub fn random_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// PKCE S256 code challenge for `verifier`.
#[must_use]
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuthClient {
        GoogleOAuthClient::new(&GoogleOAuthConfig {
            client_id: "client id".to_string(),
            client_secret: SecretString::from("s3cr3t"),
        })
    }

    #[test]
    fn test_pkce_challenge_matches_rfc7636_example() {
        assert_eq!(
            pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_random_token_shape() {
        let token = random_token(64);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, random_token(64));
    }

    #[test]
    fn test_authorization_url_carries_flow_parameters() {
        let url = client().authorization_url(
            "https://prompts.example.com/auth/google/callback",
            "state123",
            "verifier",
        );
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Fprompts.example.com%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("state=state123"));
        assert!(url.contains(&format!("code_challenge={}", pkce_challenge("verifier"))));
        assert!(url.contains("code_challenge_method=S256"));
    }
}
