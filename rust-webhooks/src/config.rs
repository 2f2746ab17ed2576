//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables. The shared secret is
//! wrapped in [`SharedSecret`] so it never shows up in debug output or logs.

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Pre-shared HMAC key agreed with Shopify.
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// What `customers/create` does when the customer already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Acknowledge and leave the stored customer untouched.
    #[default]
    Ignore,
    /// Overwrite the stored customer, like `customers/update`.
    Update,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "update" => Ok(Self::Update),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shopify webhook shared secret
    pub shared_secret: Option<SharedSecret>,

    /// SQLite connection URL
    pub database_url: String,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    /// Port for the web server to listen on
    pub port: u16,

    /// Largest webhook body accepted, in bytes
    pub max_body_bytes: usize,

    /// Behavior of `customers/create` for an already stored customer
    pub duplicate_policy: DuplicatePolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            shared_secret: env::var("SHOPIFY_SHARED_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(SharedSecret::new),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://logify.db".to_string()),

            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5),

            port: parse_var("PORT", 8080),

            max_body_bytes: parse_var("MAX_BODY_BYTES", 2 * 1024 * 1024),

            duplicate_policy: parse_var("CUSTOMER_CREATE_ON_DUPLICATE", DuplicatePolicy::Ignore),
        }
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or malformed.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_valid() {
        env::set_var("TEST_PARSE_VAR_VALID", "4242");
        let result: u16 = parse_var("TEST_PARSE_VAR_VALID", 1);
        assert_eq!(result, 4242);
        env::remove_var("TEST_PARSE_VAR_VALID");
    }

    #[test]
    fn test_parse_var_default() {
        let result: u32 = parse_var("NONEXISTENT_VAR", 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_parse_var_malformed() {
        env::set_var("TEST_PARSE_VAR_MALFORMED", "not-a-port");
        let result: u16 = parse_var("TEST_PARSE_VAR_MALFORMED", 8080);
        assert_eq!(result, 8080);
        env::remove_var("TEST_PARSE_VAR_MALFORMED");
    }

    #[test]
    fn test_duplicate_policy_parse() {
        assert_eq!("ignore".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Ignore));
        assert_eq!(" Update ".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Update));
        assert!("overwrite".parse::<DuplicatePolicy>().is_err());
    }

    #[test]
    fn test_shared_secret_debug_is_redacted() {
        let secret = SharedSecret::new("hunter2");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("hunter2"));
    }
}
