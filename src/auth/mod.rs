use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{config::AppConfig, error::ApiError};

pub mod guard;
pub mod jwt;
pub mod password;

pub use guard::{RoleGuard, has_role, require_role};
pub use jwt::Claims;

/// Role description allowed to mutate posts and manage users.
pub const TEACHER: &str = "teacher";

/// AuthUser
///
/// The decoded identity of an authenticated request. Nothing here is trusted for
/// authorization beyond the user id; the role is looked up again by `RoleGuard`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub name: String,
    pub role_id: Option<i32>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            id: claims.id,
            name: claims.name,
            role_id: claims.role_id,
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
/// Whatever follows the first whitespace-separated word is taken as the token.
fn token_from_header(value: &str) -> Option<&str> {
    value.split_whitespace().nth(1)
}

/// AuthUser Extractor Implementation
///
/// Usable as a handler argument on any route. When `auth_middleware` already ran for the
/// request the identity is taken from the request extensions; otherwise the bearer token
/// is decoded here.
///
/// Rejections: 401 "Token not provided" when there is no token, 401 "Token invalid or
/// expired" for any verification failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(token_from_header)
            .ok_or(ApiError::Unauthorized(ApiError::TOKEN_MISSING))?;

        let claims = jwt::verify_token(token, &config.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            ApiError::Unauthorized(ApiError::TOKEN_INVALID)
        })?;

        Ok(claims.into())
    }
}

/// auth_middleware
///
/// Guards a whole router: resolves `AuthUser` (rejecting the request on failure) and
/// stores it in the request extensions for the guard and handlers behind it.
pub async fn auth_middleware(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}
