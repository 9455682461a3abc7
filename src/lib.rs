use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod seed;
pub mod use_cases;

// Routers split by required access (public, authenticated, teacher).
pub mod routes;
use auth::{RoleGuard, TEACHER, auth_middleware, require_role};
use routes::{authenticated, public, teacher};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{MemoryStore, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` and rendered by
/// the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::users::create_user, handlers::users::login, handlers::users::get_user,
        handlers::users::update_user, handlers::users::remove_user, handlers::users::list_users,
        handlers::users::list_users_by_role,
        handlers::posts::list_posts, handlers::posts::list_posts_admin, handlers::posts::get_post,
        handlers::posts::search_posts, handlers::posts::list_posts_by_author,
        handlers::posts::create_post, handlers::posts::update_post, handlers::posts::remove_post
    ),
    components(
        schemas(
            models::Post, models::Role, models::UserResponse, models::LoginResponse,
            models::CreateUserRequest, models::UpdateUserRequest, models::LoginRequest,
            models::PostRequest, models::MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration, login and user management"),
        (name = "posts", description = "Blog posts"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// The state shared by every request: the repositories and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: users, posts and roles behind trait objects.
    pub repo: RepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self { repo, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routers, attaches authentication and the teacher guard to the routers
/// that need them, and wraps everything in the observability layers.
pub fn create_router(state: AppState) -> Router {
    let env = state.config.env;

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let teacher_guard = RoleGuard::new(state.repo.clone(), TEACHER);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Layers added later run first: authentication, then the role check.
        .merge(
            teacher::teacher_routes()
                .route_layer(middleware::from_fn_with_state(teacher_guard, require_role))
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state)
        // Debug detail in error bodies follows this router's environment.
        .layer(middleware::from_fn_with_state(env, error::expose_error_details));

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span carrying the `x-request-id` so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
