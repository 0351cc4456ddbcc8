mod auth_handlers;
pub mod students;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::security_headers;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/register", post(auth_handlers::register))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/students/search", get(students::search_students))
        .route("/students/filter/level", get(students::filter_by_level))
        .route(
            "/students/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
}

/// Assembles the full application.
///
/// `login_rpm` enables per-IP throttling of the auth routes; it needs the
/// peer address, so it is left off when the router is driven without a
/// socket.
pub fn build_app(state: AppState, login_rpm: Option<u32>) -> anyhow::Result<Router> {
    let auth_routes = match login_rpm {
        Some(rpm) => {
            let period_per_request = (60 / rpm.max(1)).max(1);
            let governor_config = Arc::new(
                GovernorConfigBuilder::default()
                    .per_second(period_per_request.into())
                    .burst_size(rpm.max(1))
                    .key_extractor(SmartIpKeyExtractor)
                    .finish()
                    .ok_or_else(|| anyhow::anyhow!("invalid HTTP rate limit configuration"))?,
            );
            auth_router().layer(GovernorLayer::<_, _, axum::body::Body>::new(governor_config))
        }
        None => auth_router(),
    };

    // CORS: same-origin only by default (no cross-origin requests allowed)
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let router = Router::new().nest("/api", auth_routes.merge(protected_router()));

    let router = if state.config.tls_enabled() {
        router.layer(from_fn(security_headers::security_headers_with_hsts))
    } else {
        router.layer(from_fn(security_headers::security_headers))
    };

    Ok(router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
