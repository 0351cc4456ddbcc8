mod api;
mod auth;
mod config;
mod dto;
mod error;
mod middleware;
mod state;

use std::sync::Arc;
use std::time::Duration;

use roster_core::{
    AuthError, AuthService, MemoryCredentialStore, MemoryStudentRepository, StudentService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{BootstrapConfig, ServerConfig};
use crate::state::AppState;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_web=debug,roster_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let tls_config = config.tls.clone();
    let login_rpm = config.http_rate_limit.login_requests_per_minute;
    let bootstrap = config.bootstrap.clone();

    let auth = Arc::new(AuthService::new(
        &config.auth,
        Arc::new(MemoryCredentialStore::new()),
    )?);
    let students = Arc::new(StudentService::new(Arc::new(MemoryStudentRepository::new())));

    if let Some(admin) = bootstrap {
        bootstrap_admin(&auth, &admin).await?;
    }

    let state = AppState {
        config: Arc::new(config),
        auth: auth.clone(),
        students,
    };

    // Drop limiter records whose window has passed
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = auth.rate_limiter().purge_expired();
            if removed > 0 {
                tracing::debug!("Purged {removed} expired login attempt records");
            }
        }
    });

    let app = api::build_app(state, Some(login_rpm))?;

    if let (Some(cert), Some(key)) = (&tls_config.cert_path, &tls_config.key_path) {
        use axum_server::tls_rustls::RustlsConfig;
        let rustls_config = RustlsConfig::from_pem_file(cert, key).await?;
        tracing::info!("roster-web listening on https://{}", bind_addr);
        axum_server::bind_rustls(bind_addr, rustls_config)
            .serve(app.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("roster-web listening on http://{}", bind_addr);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await?;
    }

    Ok(())
}

async fn bootstrap_admin(auth: &AuthService, admin: &BootstrapConfig) -> anyhow::Result<()> {
    match auth
        .register(&admin.username, &admin.password, &admin.password)
        .await
    {
        Ok(_) => {
            tracing::info!("Created bootstrap administrator '{}'", admin.username);
            Ok(())
        }
        Err(AuthError::AlreadyExists(_)) => {
            tracing::debug!("Bootstrap administrator '{}' already exists", admin.username);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
