//! Roster core library, authentication and student records.
//!
//! `roster-core` holds everything that does not depend on HTTP: the
//! authentication core (password hashing, JWT issuance and verification,
//! login rate limiting) and the student records service. The `roster-web`
//! binary wires these into an axum router.
//!
//! # Modules
//!
//! - [`auth`]: [`AuthService`] login/registration flows, [`TokenCodec`], [`LoginRateLimiter`].
//! - [`students`]: [`Student`] model, [`StudentRepository`] seam, [`StudentService`].
//! - [`config`]: [`AuthConfig`] loaded once at startup.
//! - [`clock`]: [`Clock`] abstraction so expiry can be tested deterministically.
//! - [`error`]: [`AuthError`] and [`StudentError`].

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod students;

pub use auth::rate_limit::{LoginRateLimiter, RateLimitConfig};
pub use auth::service::{AuthService, AuthSession};
pub use auth::store::{CredentialStore, Identity, MemoryCredentialStore, NewIdentity};
pub use auth::token::{IssuedToken, TokenCodec};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult, StudentError, StudentResult};
pub use students::model::{Page, Student, StudentInput, StudentLevel};
pub use students::repository::{MemoryStudentRepository, StudentRepository};
pub use students::service::StudentService;
