use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// ValidatedJson
///
/// A JSON body that must both deserialize into `T` and pass `T`'s `Validate` rules.
/// Either failure becomes `ApiError::Validation` (400) instead of axum's plain-text
/// rejection.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation("body", rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// ValidatedQuery
///
/// The query-string counterpart of `ValidatedJson`.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation("query", rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

/// IdPath
///
/// A single numeric path segment (`/posts/{id}`, `/users/{role}`). A non-numeric
/// segment is a validation error rather than a 404.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation("id", rejection.body_text()))?;
        Ok(IdPath(id))
    }
}
