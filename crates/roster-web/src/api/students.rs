use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::{Page, Student, StudentInput};

use crate::auth::middleware::AuthUser;
use crate::dto::{ApiResponse, LevelQuery, PageQuery, SearchQuery};
use crate::error::AppError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub async fn list_students(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<Student>> {
    let page = state.students.list(query.page, query.size).await?;
    Ok(Json(ApiResponse::ok("Students retrieved successfully", page)))
}

pub async fn get_student(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Student> {
    let student = state.students.get(id).await?;
    Ok(Json(ApiResponse::ok("Student retrieved successfully", student)))
}

pub async fn create_student(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<StudentInput>,
) -> Result<(StatusCode, Json<ApiResponse<Student>>), AppError> {
    let student = state.students.create(body).await?;
    tracing::debug!(
        "Student {} ({}) created by {}",
        student.id,
        student.level.display_name(),
        user.sub
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.as_u16(),
            "Student created successfully",
            Some(student),
        )),
    ))
}

pub async fn update_student(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<StudentInput>,
) -> ApiResult<Student> {
    let student = state.students.update(id, body).await?;
    tracing::debug!("Student {id} updated by {}", user.sub);
    Ok(Json(ApiResponse::ok("Student updated successfully", student)))
}

pub async fn delete_student(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<()> {
    state.students.delete(id).await?;
    tracing::debug!("Student {id} deleted by {}", user.sub);
    Ok(Json(ApiResponse::new(200, "Student deleted successfully", None)))
}

pub async fn search_students(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Page<Student>> {
    let page = state
        .students
        .search(&query.username, query.page, query.size)
        .await?;
    Ok(Json(ApiResponse::ok("Search completed", page)))
}

pub async fn filter_by_level(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LevelQuery>,
) -> ApiResult<Page<Student>> {
    let page = state
        .students
        .filter_by_level(query.level, query.page, query.size)
        .await?;
    Ok(Json(ApiResponse::ok("Filter completed", page)))
}
