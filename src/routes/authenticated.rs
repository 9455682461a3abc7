use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Any logged-in user. The handlers receive `AuthUser` from the request extensions
/// populated by `auth_middleware`; `update_user` does its own self-or-teacher check.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET/PUT /user/{id}
        .route(
            "/user/{id}",
            get(handlers::users::get_user).put(handlers::users::update_user),
        )
}
