use std::time::{SystemTime, UNIX_EPOCH};

use roster_core::{AuthSession, StudentLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub username: String,
    pub id: u64,
    pub expires_at: u64,
}

impl From<AuthSession> for LoginResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            token_type: session.token_type.to_string(),
            username: session.username,
            id: session.id,
            expires_at: session.expires_at,
        }
    }
}

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: u64,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, message: impl Into<String>, data: Option<T>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            status_code,
            message: message.into(),
            data,
            timestamp,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(200, message, Some(data))
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub username: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

#[derive(Debug, Deserialize)]
pub struct LevelQuery {
    pub level: StudentLevel,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

fn default_page_size() -> usize {
    20
}
