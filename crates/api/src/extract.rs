//! Request extractors that reject with [`ApiError`].

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::validation::{Validate, Violations};

/// JSON body that has been decoded and passed field validation.
///
/// An undecodable or `null` body is an `InvalidArgument`; a decodable body
/// with bad fields is a `Validation` error listing every offending field.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Option<T>>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidArgument(rejection.body_text()))?;

        let body = body.ok_or_else(|| {
            ApiError::InvalidArgument("Request body must not be null".to_string())
        })?;

        let mut violations = Violations::new();
        body.validate(&mut violations);
        if !violations.is_empty() {
            return Err(ApiError::Validation(violations.into_inner()));
        }

        Ok(ValidatedJson(body))
    }
}

/// Typed `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct IdPath<I>(pub I);

impl<S, I> FromRequestParts<S> for IdPath<I>
where
    S: Send + Sync,
    I: From<i64> + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::InvalidArgument(rejection.body_text()))?;

        Ok(IdPath(I::from(raw)))
    }
}
