use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Teacher Router Module
///
/// Post authoring and user management. `create_router` layers `require_role` for the
/// `teacher` role on top of authentication, so none of these handlers check roles again.
pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        // POST /posts
        .route("/posts", post(handlers::posts::create_post))
        // GET /posts/admin
        // Full listing for the teacher dashboard.
        .route("/posts/admin", get(handlers::posts::list_posts_admin))
        // PUT/DELETE /posts/{id}
        // Any teacher may edit or delete any post; the editor is recorded in `updated_by`.
        .route(
            "/posts/{id}",
            put(handlers::posts::update_post).delete(handlers::posts::remove_post),
        )
        // DELETE /user/{id}
        .route("/user/{id}", delete(handlers::users::remove_user))
        // GET /users
        .route("/users", get(handlers::users::list_users))
        // GET /users/{role}
        // `role` is a numeric role id.
        .route("/users/{role}", get(handlers::users::list_users_by_role))
}
