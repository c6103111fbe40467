use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, Method},
};
use crate::domain::models::auth::{Actor, Claims};
use crate::error::AppError;
use crate::state::AppState;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{warn, Span};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// A staff member authenticated by the access token issued by the auth service.
pub struct AuthUser(pub Actor);

impl AuthUser {
    pub fn staff_id(&self) -> i64 {
        self.0.staff_id
    }

    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.0.role.is_manager() {
            Ok(())
        } else {
            warn!(staff_id = self.0.staff_id, "Manager-only action refused");
            Err(AppError::Forbidden("Admin or manager role required".into()))
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookie_token = parts
            .extensions
            .get::<Cookies>()
            .and_then(|cookies| cookies.get(ACCESS_TOKEN_COOKIE))
            .map(|c| c.value().to_string());

        let access_token = cookie_token
            .or_else(|| bearer_token(&parts.headers))
            .ok_or(AppError::Unauthorized)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let decoding_key = DecodingKey::from_secret(app_state.config.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(&access_token, &decoding_key, &validation)
            .map_err(|_| AppError::Unauthorized)?;

        let method = &parts.method;
        if method != Method::GET && method != Method::HEAD && method != Method::OPTIONS {
            let csrf_header_val = parts.headers.get(CSRF_HEADER)
                .ok_or_else(|| AppError::Forbidden("Missing CSRF token".into()))?
                .to_str()
                .map_err(|_| AppError::Forbidden("Invalid CSRF token".into()))?;

            if csrf_header_val != token_data.claims.csrf_token {
                return Err(AppError::Forbidden("Invalid CSRF token".into()));
            }
        }

        let actor = Actor {
            staff_id: token_data.claims.sub,
            role: token_data.claims.role,
        };

        Span::current().record("staff_id", actor.staff_id);
        Span::current().record("role", actor.role.as_str());

        Ok(AuthUser(actor))
    }
}
