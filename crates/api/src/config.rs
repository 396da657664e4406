//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string, or `memory://` for a
//!   process-local store (local development only)
//! - `JWT_SECRET_KEY` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 8001)
//! - `FRONTEND_URL` - Site origin allowed by CORS (default: <http://localhost:3000>)
//! - `CORS_ALLOWED_ORIGINS` - Extra comma-separated origins (default: <https://sparksonic.lu>)
//! - `JWT_ALGORITHM` - `HS256` (default), `HS384` or `HS512`
//! - `JWT_ACCESS_TOKEN_EXPIRE_MINUTES` - Token lifetime (default: 10080, one week)
//! - `SMTP_SERVER` - Enables outbound email when set, together with
//!   `SMTP_PORT` (465), `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM_EMAIL`,
//!   `SMTP_TO_EMAIL` and `SMTP_SECURITY` (`tls` or `starttls`)
//! - `GOOGLE_API_KEY` / `GOOGLE_PLACE_ID` - Enables live Google reviews
//! - `GOOGLE_PLACES_BASE_URL` - Places API origin (default: <https://maps.googleapis.com>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::auth::TokenAlgorithm;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default token lifetime in minutes (one week).
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 10_080;

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

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Store connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
    /// Bearer token settings
    pub auth: AuthConfig,
    /// Outbound email settings (disabled when absent)
    pub email: Option<EmailConfig>,
    /// Google Places settings for the reviews proxy
    pub reviews: ReviewsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Token signing configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret. Rotating it invalidates every issued token.
    pub jwt_secret: SecretString,
    /// Signing algorithm
    pub algorithm: TokenAlgorithm,
    /// Token lifetime
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// TLS from the first byte (SMTPS, usually port 465).
    #[default]
    Tls,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    StartTls,
}

/// SMTP configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// Connection security
    pub security: SmtpSecurity,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
    /// Business inbox that receives form notifications
    pub business_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("security", &self.security)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("business_address", &self.business_address)
            .finish()
    }
}

/// Google Places configuration for the reviews proxy.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ReviewsConfig {
    /// Places API origin
    pub base_url: String,
    /// Places API key
    pub api_key: Option<SecretString>,
    /// Place identifier of the business listing
    pub place_id: Option<String>,
}

impl std::fmt::Debug for ReviewsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("place_id", &self.place_id)
            .finish()
    }
}

impl ApiConfig {
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

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = parse_env("API_HOST", "127.0.0.1")?;
        let port = parse_env("API_PORT", "8001")?;

        let frontend_url = get_env_or_default("FRONTEND_URL", "http://localhost:3000");
        let extra_origins = get_env_or_default("CORS_ALLOWED_ORIGINS", "https://sparksonic.lu");
        let cors_origins = parse_origins(&frontend_url, &extra_origins)?;

        let auth = AuthConfig::from_env()?;
        let email = EmailConfig::from_env()?;
        let reviews = ReviewsConfig::from_env();

        Ok(Self {
            database_url,
            host,
            port,
            cors_origins,
            auth,
            email,
            reviews,
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
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_validated_secret("JWT_SECRET_KEY")?;
        validate_secret_length(&jwt_secret, "JWT_SECRET_KEY")?;

        let algorithm = get_env_or_default("JWT_ALGORITHM", "HS256")
            .parse::<TokenAlgorithm>()
            .map_err(|e| ConfigError::InvalidEnvVar("JWT_ALGORITHM".to_string(), e))?;

        let minutes: i64 = parse_env(
            "JWT_ACCESS_TOKEN_EXPIRE_MINUTES",
            &DEFAULT_TOKEN_TTL_MINUTES.to_string(),
        )?;
        if minutes <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_ACCESS_TOKEN_EXPIRE_MINUTES".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            jwt_secret,
            algorithm,
            token_ttl: Duration::minutes(minutes),
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_SERVER") else {
            return Ok(None);
        };

        let security = match get_env_or_default("SMTP_SECURITY", "tls")
            .to_lowercase()
            .as_str()
        {
            "tls" | "ssl" => SmtpSecurity::Tls,
            "starttls" => SmtpSecurity::StartTls,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "SMTP_SECURITY".to_string(),
                    format!("expected 'tls' or 'starttls', got '{other}'"),
                ));
            }
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_env("SMTP_PORT", "465")?,
            security,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: get_required_secret("SMTP_PASSWORD")?,
            from_address: get_required_env("SMTP_FROM_EMAIL")?,
            business_address: get_required_env("SMTP_TO_EMAIL")?,
        }))
    }
}

impl ReviewsConfig {
    fn from_env() -> Self {
        Self {
            base_url: get_env_or_default("GOOGLE_PLACES_BASE_URL", "https://maps.googleapis.com"),
            api_key: get_optional_env("GOOGLE_API_KEY").map(SecretString::from),
            place_id: get_optional_env("GOOGLE_PLACE_ID"),
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

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Merge the frontend origin with the extra comma-separated list, deduplicated.
///
/// Credentialed CORS needs explicit origins, so a `*` entry is rejected.
fn parse_origins(frontend_url: &str, extra: &str) -> Result<Vec<String>, ConfigError> {
    let sources = std::iter::once(("FRONTEND_URL", frontend_url))
        .chain(extra.split(',').map(|o| ("CORS_ALLOWED_ORIGINS", o)));

    let mut origins: Vec<String> = Vec::new();
    for (key, origin) in sources {
        let origin = origin.trim().trim_end_matches('/');
        if origin == "*" {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "wildcard origin '*' is not allowed; list explicit origins".to_string(),
            ));
        }
        if !origin.is_empty() && !origins.iter().any(|o| o == origin) {
            origins.push(origin.to_string());
        }
    }
    Ok(origins)
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-secret-here", "JWT_SECRET_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "JWT_SECRET_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "JWT_SECRET_KEY");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "JWT_SECRET_KEY").is_err());
        assert!(validate_secret_length(&SecretString::from("a".repeat(32)), "JWT_SECRET_KEY").is_ok());
    }

    #[test]
    fn test_parse_origins_merges_and_dedupes() {
        let origins = parse_origins(
            "http://localhost:3000/",
            "https://sparksonic.lu, http://localhost:3000,,https://www.sparksonic.lu",
        )
        .unwrap();
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://sparksonic.lu".to_string(),
                "https://www.sparksonic.lu".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_origins_rejects_wildcard() {
        let err = parse_origins("http://localhost:3000", "https://sparksonic.lu, *").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "CORS_ALLOWED_ORIGINS"
        ));

        let err = parse_origins("*", "").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "FRONTEND_URL"
        ));
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("memory://"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8001,
            cors_origins: vec!["http://localhost:3000".to_string()],
            auth: AuthConfig {
                jwt_secret: SecretString::from("x".repeat(32)),
                algorithm: TokenAlgorithm::Hs256,
                token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            },
            email: None,
            reviews: ReviewsConfig {
                base_url: "https://maps.googleapis.com".to_string(),
                api_key: None,
                place_id: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8001);
    }

    #[test]
    fn test_configs_debug_redacts_secrets() {
        let email = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            security: SmtpSecurity::Tls,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("super_secret_smtp_password"),
            from_address: "noreply@sparksonic.lu".to_string(),
            business_address: "info@sparksonic.lu".to_string(),
        };
        let auth = AuthConfig {
            jwt_secret: SecretString::from("super_secret_signing_key"),
            algorithm: TokenAlgorithm::Hs256,
            token_ttl: Duration::minutes(5),
        };
        let reviews = ReviewsConfig {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: Some(SecretString::from("super_secret_google_key")),
            place_id: Some("place-123".to_string()),
        };

        let output = format!("{email:?} {auth:?} {reviews:?}");

        assert!(output.contains("smtp.example.com"));
        assert!(output.contains("place-123"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("super_secret_smtp_password"));
        assert!(!output.contains("super_secret_signing_key"));
        assert!(!output.contains("super_secret_google_key"));
    }
}
