//! Error types for `roster-core`.
//!
//! Authentication flows and configuration checks return [`AuthResult<T>`];
//! student operations return [`StudentResult<T>`].

/// Outcome of a failed authentication, registration or token check.
///
/// `InvalidCredentials` and `TokenInvalid` each merge several underlying
/// causes. Their messages are fixed so callers cannot tell the causes apart.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The rate-limit key has reached its failure threshold.
    #[error("too many login attempts, please try again later")]
    TooManyAttempts,

    /// Registration password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// An identity with this username already exists.
    #[error("username already exists: {0}")]
    AlreadyExists(String),

    /// Malformed, expired or wrongly signed token.
    #[error("invalid or expired token")]
    TokenInvalid,

    /// The credential store could not be reached.
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(String),

    /// Password hashing failed or the hashing task was lost.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The signing key or limiter settings are unusable.
    #[error("invalid auth configuration: {0}")]
    ConfigInvalid(String),
}

/// Errors raised by the student records service.
#[derive(Debug, thiserror::Error)]
pub enum StudentError {
    #[error("student with id {0} not found")]
    NotFound(u64),

    #[error("student with username {0} already exists")]
    AlreadyExists(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("student repository unavailable: {0}")]
    StoreUnavailable(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
pub type StudentResult<T> = Result<T, StudentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_message_is_generic() {
        let err = AuthError::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn token_invalid_message_is_generic() {
        let err = AuthError::TokenInvalid;
        assert_eq!(err.to_string(), "invalid or expired token");
    }

    #[test]
    fn already_exists_displays_username() {
        let err = AuthError::AlreadyExists("bob".to_string());
        assert_eq!(err.to_string(), "username already exists: bob");
    }

    #[test]
    fn student_not_found_displays_id() {
        let err = StudentError::NotFound(7);
        assert_eq!(err.to_string(), "student with id 7 not found");
    }
}
