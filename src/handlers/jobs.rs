use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::database;
use crate::error::ApiError;
use crate::middleware::auth::{ensure_admin, ensure_logged_in, AuthUser};
use crate::models::job::{Job, JobNew, JobSearchFilters, JobUpdate};

/// POST /jobs - create a job for an existing company.
///
/// Authorization required: login and admin. Returns 201 with the created row
/// including the store-assigned id.
pub async fn create(
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = auth.map(|Extension(u)| u);
    ensure_logged_in(user.as_ref())?;
    ensure_admin(user.as_ref())?;

    let data: JobNew =
        serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    data.validate()?;

    let pool = database::pool().await?;
    let job = Job::create(&pool, data).await?;

    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

/// GET /jobs - list jobs, optionally filtered by
/// title (substring, case-insensitive), minSalary, hasEquity.
///
/// Authorization required: none.
pub async fn list(Query(filters): Query<JobSearchFilters>) -> Result<Json<Value>, ApiError> {
    let pool = database::pool().await?;
    let jobs = Job::find_all(&pool, &filters).await?;

    Ok(Json(json!({ "jobs": jobs })))
}

/// GET /jobs/:id - one job by id.
///
/// Authorization required: none.
pub async fn get(Path(id): Path<i32>) -> Result<Json<Value>, ApiError> {
    let pool = database::pool().await?;
    let job = Job::get(&pool, id).await?;

    Ok(Json(json!({ "job": job })))
}

/// PATCH /jobs/:id - partial update.
/// Fields can be: title, salary, equity. id and companyHandle are rejected.
///
/// Authorization required: login and admin.
pub async fn update(
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let user = auth.map(|Extension(u)| u);
    ensure_logged_in(user.as_ref())?;
    ensure_admin(user.as_ref())?;

    let data: JobUpdate =
        serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    data.validate()?;

    let pool = database::pool().await?;
    let job = Job::update(&pool, id, data).await?;

    Ok(Json(json!({ "job": job })))
}

/// DELETE /jobs/:id
///
/// Authorization required: login and admin.
pub async fn remove(
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let user = auth.map(|Extension(u)| u);
    ensure_logged_in(user.as_ref())?;
    ensure_admin(user.as_ref())?;

    let pool = database::pool().await?;
    Job::remove(&pool, id).await?;

    Ok(Json(json!({ "deleted": id })))
}
