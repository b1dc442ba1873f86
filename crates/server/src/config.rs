//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKET_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `MARKET_BASE_URL` - Public URL of the site, used for cookies and OAuth redirects
//!
//! ## Optional
//! - `MARKET_HOST` - Bind address (default: 127.0.0.1)
//! - `MARKET_PORT` - Listen port (default: 3000)
//! - `MARKET_CLAIM_TIMEOUT_SECS` - Upper bound on one claim transaction (default: 10)
//! - `MARKET_ADMIN_CACHE_TTL_SECS` - How long an admin lookup is cached (default: 30)
//! - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` - Google sign-in, both or neither
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Upper bound on a single claim transaction
    pub claim_timeout: Duration,
    /// Time-to-live of cached admin lookups
    pub admin_cache_ttl: Duration,
    /// Google sign-in, when configured
    pub google: Option<GoogleOAuthConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Google OAuth client credentials.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MARKET_DATABASE_URL")?;
        let host = parse_env("MARKET_HOST", "127.0.0.1")?;
        let port = parse_env("MARKET_PORT", "3000")?;
        let base_url = normalize_base_url(&get_required_env("MARKET_BASE_URL")?)?;
        let claim_timeout = Duration::from_secs(parse_env("MARKET_CLAIM_TIMEOUT_SECS", "10")?);
        let admin_cache_ttl =
            Duration::from_secs(parse_env("MARKET_ADMIN_CACHE_TTL_SECS", "30")?);

        let google = GoogleOAuthConfig::from_parts(
            get_optional_env("GOOGLE_CLIENT_ID"),
            get_optional_env("GOOGLE_CLIENT_SECRET"),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            claim_timeout,
            admin_cache_ttl,
            google,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl GoogleOAuthConfig {
    /// Build from the optional id/secret pair.
    ///
    /// Returns `Ok(None)` when both are absent, so Google sign-in is simply
    /// switched off.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when only one half is set and
    /// `ConfigError::InsecureSecret` when the secret looks like a placeholder.
    pub fn from_parts(
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        match (client_id, client_secret) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "GOOGLE_CLIENT_SECRET".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("GOOGLE_CLIENT_ID".to_string())),
            (Some(client_id), Some(secret)) => {
                validate_secret_strength(&secret, "GOOGLE_CLIENT_SECRET")?;
                Ok(Some(Self {
                    client_id,
                    client_secret: SecretString::from(secret),
                }))
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Check the base URL is absolute http(s) and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("MARKET_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "MARKET_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    fn config(base_url: &str) -> MarketConfig {
        MarketConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            claim_timeout: Duration::from_secs(10),
            admin_cache_ttl: Duration::from_secs(30),
            google: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-client-secret", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        assert!(validate_secret_strength(&"a".repeat(33), "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(STRONG_SECRET, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_google_config_absent_pair_disables() {
        assert!(GoogleOAuthConfig::from_parts(None, None).unwrap().is_none());
    }

    #[test]
    fn test_google_config_half_pair_is_error() {
        let err = GoogleOAuthConfig::from_parts(Some("id".into()), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "GOOGLE_CLIENT_SECRET"));
        let err = GoogleOAuthConfig::from_parts(None, Some(STRONG_SECRET.into())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "GOOGLE_CLIENT_ID"));
    }

    #[test]
    fn test_google_config_rejects_placeholder_secret() {
        let err =
            GoogleOAuthConfig::from_parts(Some("id".into()), Some("changeme".into())).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_google_config_debug_redacts_secret() {
        let google = GoogleOAuthConfig::from_parts(
            Some("client-id-value".into()),
            Some(STRONG_SECRET.into()),
        )
        .unwrap()
        .unwrap();
        let debug_output = format!("{google:?}");
        assert!(debug_output.contains("client-id-value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(STRONG_SECRET));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://prompts.example.com/").unwrap(),
            "https://prompts.example.com"
        );
        assert!(normalize_base_url("ftp://prompts.example.com").is_err());
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let local = config("http://localhost:3000");
        assert_eq!(local.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(!local.is_secure());
        assert!(config("https://prompts.example.com").is_secure());
    }
}
