use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{ApiResponse, LoginRequest, LoginResponse, RegisterRequest};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let session = state.auth.login(&body.username, &body.password).await?;

    Ok(Json(ApiResponse::ok("Login successful", session.into())))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoginResponse>>), AppError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let session = state
        .auth
        .register(&body.username, &body.password, &body.confirm_password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.as_u16(),
            "Admin registered successfully",
            Some(session.into()),
        )),
    ))
}
