use blog_api::{
    AppState,
    config::{AppConfig, Env},
    create_router, db,
    repository::RepositoryState,
    seed,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, connects to Postgres, applies the schema and
/// serves the API.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail fast on missing or malformed variables)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: Invalid configuration");

    // 2. Logging. RUST_LOG wins over the defaults below.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blog_api=debug,tower_http=info".into());

    match config.env {
        Env::Development | Env::Test => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database
    let pool = db::connect_with_retry(
        config.connect_options(),
        config.db_max_connections,
        config.db_connect_attempts,
        config.db_connect_retry_delay,
    )
    .await
    .expect("FATAL: Failed to connect to Postgres. Check the DB_* variables.");

    db::bootstrap_schema(&pool)
        .await
        .expect("FATAL: Failed to apply the database schema.");

    let repo = RepositoryState::postgres(pool);

    // DEVELOPMENT-ONLY: demo teacher and student accounts for trying the API by hand.
    if config.env == Env::Development {
        let created = seed::seed_demo_users(&repo.users)
            .await
            .expect("FATAL: Failed to seed the demo users.");
        tracing::info!("Seeded {created} demo user(s)");
    }

    // 4. State and router
    let port = config.port;
    let app = create_router(AppState::new(repo, config));

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("FATAL: Failed to bind the HTTP port.");

    tracing::info!("Listening on 0.0.0.0:{port}");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
