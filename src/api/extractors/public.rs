use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use crate::api::extractors::auth::CSRF_HEADER;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::warn;

pub const CSRF_COOKIE: &str = "csrf_token";

/// Gate for the public booking form: per-client rate limit, then a
/// double-submit CSRF check of the header against the cookie.
pub struct PublicSubmission;

/// First `X-Forwarded-For` hop, then `X-Real-IP`.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("X-Real-IP").and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

impl FromRequestParts<Arc<AppState>> for PublicSubmission {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let client = client_key(&parts.headers);
        if state.public_limiter.check_key(&client).is_err() {
            warn!(client = %client, "Public submission rate limited");
            return Err(AppError::RateLimited);
        }

        let cookie_token = parts
            .extensions
            .get::<Cookies>()
            .and_then(|cookies| cookies.get(CSRF_COOKIE))
            .map(|c| c.value().to_string())
            .ok_or_else(|| AppError::Forbidden("Missing CSRF token".into()))?;

        let header_token = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Forbidden("Missing CSRF token".into()))?;

        if cookie_token.is_empty() || header_token != cookie_token {
            return Err(AppError::Forbidden("Invalid CSRF token".into()));
        }

        Ok(PublicSubmission)
    }
}
