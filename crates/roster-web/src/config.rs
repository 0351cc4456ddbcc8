use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use roster_core::AuthConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub http_rate_limit: HttpRateLimitConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,
}

/// Per-IP request throttling on the auth routes, in front of the
/// per-username login limiter in the core.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpRateLimitConfig {
    #[serde(default = "default_login_rpm")]
    pub login_requests_per_minute: u32,
}

/// Administrator account created at startup if it does not exist yet.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_login_rpm() -> u32 {
    30
}

impl Default for HttpRateLimitConfig {
    fn default() -> Self {
        Self {
            login_requests_per_minute: default_login_rpm(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth: AuthConfig::default(),
            http_rate_limit: HttpRateLimitConfig::default(),
            tls: TlsConfig::default(),
            bootstrap: None,
        }
    }
}

const WEAK_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "secret",
    "password",
    "jwt-secret",
];

impl ServerConfig {
    pub fn tls_enabled(&self) -> bool {
        self.tls.cert_path.is_some() && self.tls.key_path.is_some()
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Reads `ROSTER_CONFIG` (if set), applies `ROSTER_*` environment
    /// overrides and validates the result.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("ROSTER_CONFIG").map(PathBuf::from) {
            Ok(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            Err(_) => ServerConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.finalize()?;
        Ok(config)
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(secret) = lookup("ROSTER_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(addr) = lookup("ROSTER_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Some(ttl) = lookup("ROSTER_TOKEN_TTL_SECS") {
            self.auth.token_ttl_secs = ttl.parse()?;
        }
        if let Some(max) = lookup("ROSTER_MAX_LOGIN_ATTEMPTS") {
            self.auth.rate_limit.max_attempts = max.parse()?;
        }
        if let Some(window) = lookup("ROSTER_LOGIN_WINDOW_SECS") {
            self.auth.rate_limit.window_secs = window.parse()?;
        }
        if let Some(cert) = lookup("ROSTER_TLS_CERT") {
            self.tls.cert_path = Some(cert);
        }
        if let Some(key) = lookup("ROSTER_TLS_KEY") {
            self.tls.key_path = Some(key);
        }
        Ok(())
    }

    /// Fills in a random signing secret when none is configured and rejects
    /// known placeholder secrets and out-of-range limiter values.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.is_empty() {
            let mut bytes = [0u8; 64];
            rand::thread_rng().fill_bytes(&mut bytes);
            self.auth.jwt_secret = STANDARD.encode(bytes);
            tracing::warn!(
                "No JWT secret configured. Generated random secret (tokens will not survive a restart)."
            );
        }

        if WEAK_SECRETS.iter().any(|&w| self.auth.jwt_secret == w) {
            anyhow::bail!(
                "JWT secret matches a known weak/placeholder value. \
                 Set a strong random base64 secret via ROSTER_JWT_SECRET."
            );
        }

        self.auth.validate()?;
        Ok(())
    }
}
