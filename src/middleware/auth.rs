use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// JWT authentication middleware.
///
/// When a valid bearer token is present, the decoded identity is injected into
/// request extensions. A missing or invalid token is NOT an error here: the
/// request proceeds anonymously and the per-route predicates decide whether
/// that is acceptable.
pub async fn authenticate_jwt(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_jwt_from_headers(&headers) {
        if let Ok(claims) = validate_jwt(&token) {
            request.extensions_mut().insert(AuthUser::from(claims));
        }
    }

    next.run(request).await
}

/// Extract JWT token from Authorization header, if one was sent
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?
        .to_str()
        .ok()?;

    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

/// Require any authenticated user.
pub fn ensure_logged_in(user: Option<&AuthUser>) -> Result<&AuthUser, ApiError> {
    user.ok_or_else(|| ApiError::unauthorized("Must be logged in"))
}

/// Require an authenticated admin user.
pub fn ensure_admin(user: Option<&AuthUser>) -> Result<&AuthUser, ApiError> {
    match user {
        Some(u) if u.is_admin => Ok(u),
        _ => Err(ApiError::unauthorized("Must be an admin")),
    }
}

/// Require an admin, or the authenticated user named by the route parameter.
pub fn ensure_admin_or_self<'a>(
    user: Option<&'a AuthUser>,
    target_username: &str,
) -> Result<&'a AuthUser, ApiError> {
    match user {
        Some(u) if u.is_admin || u.username == target_username => Ok(u),
        _ => Err(ApiError::unauthorized(
            "Must be an admin or the user themselves",
        )),
    }
}
