use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Registration, login and every read-only view of posts.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET / and GET /health
        // Liveness checks for load balancers.
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        // POST /user
        // Registration. Rejects duplicate emails with 400.
        .route("/user", post(handlers::users::create_user))
        // POST /user/login
        // Returns a signed token together with the public user view.
        .route("/user/login", post(handlers::users::login))
        // GET /user/{id}/posts
        // Posts authored by one user.
        .route("/user/{id}/posts", get(handlers::posts::list_posts_by_author))
        // GET /posts
        .route("/posts", get(handlers::posts::list_posts))
        // GET /posts/search?search=...
        // Static segment; takes precedence over /posts/{id}.
        .route("/posts/search", get(handlers::posts::search_posts))
        // GET /posts/{id}
        .route("/posts/{id}", get(handlers::posts::get_post))
}
