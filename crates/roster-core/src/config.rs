//! Authentication settings, deserialized as part of the server's TOML file.
//!
//! Everything here is read once at startup and passed into constructors.
//! Nothing in the core reads configuration from ambient global state.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::auth::rate_limit::RateLimitConfig;
use crate::error::{AuthError, AuthResult};

/// Settings for the token codec and login rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base64-encoded HMAC signing secret (at least 64 bytes once decoded).
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

fn default_token_ttl_secs() -> u64 {
    24 * 3600
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Checks value ranges. The secret itself is checked when the token
    /// codec decodes it.
    pub fn validate(&self) -> AuthResult<()> {
        if self.token_ttl_secs == 0 {
            return Err(AuthError::ConfigInvalid(
                "token_ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.max_attempts == 0 {
            return Err(AuthError::ConfigInvalid(
                "rate_limit.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(AuthError::ConfigInvalid(
                "rate_limit.window_secs must be greater than 0".to_string(),
            ));
        }
        if SystemTime::now().checked_add(self.rate_limit.window()).is_none() {
            return Err(AuthError::ConfigInvalid(format!(
                "rate_limit.window_secs {} is out of range",
                self.rate_limit.window_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = AuthConfig::default();
        assert!(config.jwt_secret.is_empty());
        assert_eq!(config.token_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let config: AuthConfig = toml::from_str(
            r#"
jwt_secret = "c2VjcmV0"
token_ttl_secs = 900

[rate_limit]
max_attempts = 3
window_secs = 120
"#,
        )
        .unwrap();

        assert_eq!(config.jwt_secret, "c2VjcmV0");
        assert_eq!(config.token_ttl_secs, 900);
        assert_eq!(config.rate_limit.max_attempts, 3);
        assert_eq!(config.rate_limit.window_secs, 120);
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config: AuthConfig = toml::from_str("").unwrap();
        assert_eq!(config.token_ttl_secs, 86_400);
        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let config: AuthConfig = toml::from_str("[rate_limit]\nmax_attempts = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(AuthError::ConfigInvalid(_))));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let config = AuthConfig {
            token_ttl_secs: 0,
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = AuthConfig::default();
        config.rate_limit.window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn window_past_end_of_time_is_rejected() {
        let mut config = AuthConfig::default();
        config.rate_limit.window_secs = u64::MAX;
        assert!(matches!(config.validate(), Err(AuthError::ConfigInvalid(_))));
    }
}
