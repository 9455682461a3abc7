use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{auth::password::PasswordError, config::Env};

/// ApiError
///
/// The single error type every handler, extractor and guard returns. The
/// `IntoResponse` impl below is the centralized error handler: it decides the
/// status code and JSON body for each kind.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, path or query. `errors` maps each offending field to its messages.
    #[error("Validation error")]
    Validation { errors: Value },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const TOKEN_MISSING: &'static str = "Token not provided";
    pub const TOKEN_INVALID: &'static str = "Token invalid or expired";
    pub const FORBIDDEN_ROLE: &'static str = "Unauthorized";

    pub fn not_found() -> Self {
        ApiError::NotFound("Resource not found".to_string())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            errors: serde_json::json!({ field: [message.into()] }),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_)
            | ApiError::Password(_)
            | ApiError::Token(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("invalid {}", e.code),
                    })
                    .collect::<Vec<_>>();
                (field.to_string(), Value::from(messages))
            })
            .collect::<serde_json::Map<_, _>>();

        ApiError::Validation {
            errors: Value::Object(fields),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

/// ErrorDetail
///
/// Attached to the response extensions of errors that may show debug detail
/// (validation, not found, internal). `expose_error_details` turns it into the
/// `stack` field; without that layer it never reaches the client.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    body: ErrorBody,
    debug: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let debug = format!("{self:?}");

        let (body, detailed) = match self {
            ApiError::Validation { errors } => (
                ErrorBody {
                    message: "Validation error".to_string(),
                    errors: Some(errors),
                    stack: None,
                },
                true,
            ),
            ApiError::NotFound(message) => (
                ErrorBody {
                    message,
                    errors: None,
                    stack: None,
                },
                true,
            ),
            ApiError::BadRequest(message) => (
                ErrorBody {
                    message,
                    errors: None,
                    stack: None,
                },
                false,
            ),
            ApiError::Unauthorized(message) => (
                ErrorBody {
                    message: message.to_string(),
                    errors: None,
                    stack: None,
                },
                false,
            ),
            other => {
                tracing::error!(error = ?other, "request failed with an internal error");
                (
                    ErrorBody {
                        message: "Internal server error".to_string(),
                        errors: None,
                        stack: None,
                    },
                    true,
                )
            }
        };

        let mut response = (status, Json(body.clone())).into_response();
        if detailed {
            response
                .extensions_mut()
                .insert(ErrorDetail { body, debug });
        }
        response
    }
}

/// expose_error_details
///
/// Router-wide layer. In development, rewrites error bodies carrying an `ErrorDetail`
/// to include the debug rendering as `stack`. Other environments pass responses through.
pub async fn expose_error_details(State(env): State<Env>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if env != Env::Development {
        return response;
    }
    let Some(ErrorDetail { mut body, debug }) = response.extensions().get::<ErrorDetail>().cloned()
    else {
        return response;
    };

    body.stack = Some(debug);
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Json(body).into_response().into_body())
}
