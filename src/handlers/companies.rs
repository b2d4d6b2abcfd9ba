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
use crate::models::company::{Company, CompanyNew, CompanySearchFilters, CompanyUpdate};

/// POST /companies - create a company
///
/// Authorization required: login and admin. Returns 201 with the created row.
pub async fn create(
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = auth.map(|Extension(u)| u);
    ensure_logged_in(user.as_ref())?;
    ensure_admin(user.as_ref())?;

    let data: CompanyNew =
        serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    data.validate()?;

    let pool = database::pool().await?;
    let company = Company::create(&pool, data).await?;

    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

/// GET /companies - list companies, optionally filtered by
/// name (substring, case-insensitive), minEmployees, maxEmployees.
///
/// Authorization required: none.
pub async fn list(Query(filters): Query<CompanySearchFilters>) -> Result<Json<Value>, ApiError> {
    filters.validate()?;

    let pool = database::pool().await?;
    let companies = Company::find_all(&pool, &filters).await?;

    Ok(Json(json!({ "companies": companies })))
}

/// GET /companies/:handle - one company with its jobs embedded.
///
/// Authorization required: none.
pub async fn get(Path(handle): Path<String>) -> Result<Json<Value>, ApiError> {
    let pool = database::pool().await?;
    let company = Company::get(&pool, &handle).await?;

    Ok(Json(json!({ "company": company })))
}

/// PATCH /companies/:handle - partial update.
/// Fields can be: name, description, numEmployees, logoUrl.
///
/// Authorization required: login and admin.
pub async fn update(
    auth: Option<Extension<AuthUser>>,
    Path(handle): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let user = auth.map(|Extension(u)| u);
    ensure_logged_in(user.as_ref())?;
    ensure_admin(user.as_ref())?;

    let data: CompanyUpdate =
        serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    data.validate()?;

    let pool = database::pool().await?;
    let company = Company::update(&pool, &handle, data).await?;

    Ok(Json(json!({ "company": company })))
}

/// DELETE /companies/:handle - delete a company and, via cascade, its jobs.
///
/// Authorization required: login and admin.
pub async fn remove(
    auth: Option<Extension<AuthUser>>,
    Path(handle): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = auth.map(|Extension(u)| u);
    ensure_logged_in(user.as_ref())?;
    ensure_admin(user.as_ref())?;

    let pool = database::pool().await?;
    Company::remove(&pool, &handle).await?;

    Ok(Json(json!({ "deleted": handle })))
}
