use std::{env, str::FromStr, time::Duration};

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// shared read-only with every request through `AppState` (pulled out via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and error detail exposure.
    pub env: Env,
    // TCP port the HTTP server binds to.
    pub port: u16,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_pass: String,
    pub db_name: String,
    // Upper bound for the Postgres connection pool.
    pub db_max_connections: u32,
    // Bounded retry for the initial database connection.
    pub db_connect_attempts: u32,
    pub db_connect_retry_delay: Duration,
    // Shared HS256 secret used to sign and verify session tokens.
    pub jwt_secret: String,
    // Lifetime of an issued session token.
    pub jwt_ttl: Duration,
}

/// Env
///
/// The runtime context the process was started in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Development,
    Production,
    Test,
}

impl FromStr for Env {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Env::Development),
            "production" => Ok(Env::Production),
            "test" => Ok(Env::Test),
            _ => Err(()),
        }
    }
}

/// Reasons the environment cannot be turned into an `AppConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
const DEFAULT_JWT_TTL_SECS: u64 = 2 * 60 * 60;

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Test,
            port: DEFAULT_PORT,
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_user: "postgres".to_string(),
            db_pass: "postgres".to_string(),
            db_name: "blog_test".to_string(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            db_connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            db_connect_retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            jwt_ttl: Duration::from_secs(DEFAULT_JWT_TTL_SECS),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the process environment. Any missing required
    /// variable or malformed value is an error; the caller is expected to abort startup.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// from_lookup
    ///
    /// Builds the configuration from an arbitrary key lookup, so the parsing rules can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));

        // NODE_ENV names the environment; APP_ENV is honoured when it is absent.
        let env_var = ["NODE_ENV", "APP_ENV"]
            .into_iter()
            .find_map(|var| lookup(var).map(|value| (var, value)));
        let env = match env_var {
            Some((var, value)) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value })?,
            None => Env::Development,
        };

        Ok(Self {
            env,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            db_host: required("DB_HOST")?,
            db_port: parse_required(&lookup, "DB_PORT")?,
            db_user: required("DB_USER")?,
            db_pass: required("DB_PASS")?,
            db_name: required("DB_NAME")?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            db_connect_attempts: parse_or(&lookup, "DB_CONNECT_ATTEMPTS", DEFAULT_CONNECT_ATTEMPTS)?,
            db_connect_retry_delay: Duration::from_millis(parse_or(
                &lookup,
                "DB_CONNECT_RETRY_DELAY_MS",
                DEFAULT_RETRY_DELAY_MS,
            )?),
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl: Duration::from_secs(parse_or(&lookup, "JWT_TTL_SECONDS", DEFAULT_JWT_TTL_SECS)?),
        })
    }

    /// Connection options for the Postgres pool, assembled from the discrete DB_* settings.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_pass)
            .database(&self.db_name)
    }
}

fn parse_required<F, T>(lookup: &F, var: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let value = lookup(var).ok_or(ConfigError::Missing(var))?;
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
