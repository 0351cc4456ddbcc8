//! Authentication core: password hashing, JWT codec, login rate limiting
//! and the orchestrating [`AuthService`](service::AuthService).

pub mod password;
pub mod rate_limit;
pub mod service;
pub mod store;
pub mod token;
