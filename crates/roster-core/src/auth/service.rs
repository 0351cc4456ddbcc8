//! Login and registration flows.
//!
//! [`AuthService`] ties the credential store, token codec and login rate
//! limiter together. Every failure is returned to the caller as an
//! [`AuthError`]; nothing is retried here.

use std::sync::Arc;

use crate::auth::password::{hash_password, hash_password_blocking, verify_password_blocking};
use crate::auth::rate_limit::LoginRateLimiter;
use crate::auth::store::{CredentialStore, NewIdentity};
use crate::auth::token::TokenCodec;
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Verified against when the username is unknown, so that path costs the
/// same Argon2 work as a wrong password.
const DUMMY_PASSWORD: &str = "roster-timing-equaliser";

/// Returned by a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub token_type: &'static str,
    pub username: String,
    pub id: u64,
    pub expires_at: u64,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
    limiter: LoginRateLimiter,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(config: &AuthConfig, store: Arc<dyn CredentialStore>) -> AuthResult<Self> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        config.validate()?;

        let codec = TokenCodec::new(&config.jwt_secret, config.token_ttl(), clock.clone())?;
        let limiter = LoginRateLimiter::with_clock(&config.rate_limit, clock);

        Ok(Self {
            store,
            codec,
            limiter,
            dummy_hash: hash_password(DUMMY_PASSWORD)?,
        })
    }

    pub fn rate_limiter(&self) -> &LoginRateLimiter {
        &self.limiter
    }

    /// Authenticates `username` and issues a token.
    ///
    /// The key is checked against the rate limiter before the password is
    /// looked at. Unknown users and wrong passwords both count as a failed
    /// attempt and both return [`AuthError::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<AuthSession> {
        let username = username.trim();
        if self.limiter.is_blocked(username) {
            tracing::warn!("Blocked login attempt for rate-limited user: {username}");
            return Err(AuthError::TooManyAttempts);
        }

        let identity = self.store.lookup(username).await?;

        let hash = identity
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |found| found.password_hash.clone());
        let password_ok = verify_password_blocking(hash, password.to_string()).await?;

        let identity = match identity {
            Some(found) if password_ok => found,
            _ => {
                self.limiter.record_attempt(username);
                tracing::warn!("Failed login attempt for user: {username}");
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.limiter.reset_attempts(username);
        let issued = self.codec.issue(&identity.username)?;

        tracing::info!("Login succeeded for user: {username}");

        Ok(AuthSession {
            token: issued.token,
            token_type: "Bearer",
            username: identity.username,
            id: identity.id,
            expires_at: issued.expires_at,
        })
    }

    /// Creates a new identity and issues a token for it.
    ///
    /// Surrounding whitespace is not part of a username, here or in
    /// [`login`](Self::login).
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> AuthResult<AuthSession> {
        let username = username.trim();
        if password != confirm_password {
            tracing::debug!("Registration rejected for {username}: password mismatch");
            return Err(AuthError::PasswordMismatch);
        }

        if self.store.exists(username).await? {
            tracing::debug!("Registration rejected: {username} already exists");
            return Err(AuthError::AlreadyExists(username.to_string()));
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let saved = self
            .store
            .save(NewIdentity {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        let issued = self.codec.issue(&saved.username)?;

        tracing::info!("Registered user: {} (id={})", saved.username, saved.id);

        Ok(AuthSession {
            token: issued.token,
            token_type: "Bearer",
            username: saved.username,
            id: saved.id,
            expires_at: issued.expires_at,
        })
    }

    /// Returns the subject of a valid token.
    pub fn verify_token(&self, token: &str) -> AuthResult<String> {
        self.codec.verify(token)
    }
}
