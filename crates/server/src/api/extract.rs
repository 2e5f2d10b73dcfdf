//! Extractors that reject with the API error body.
//!
//! axum's own `Json` and `Path` rejections answer in plain text with a mix of
//! 400/415/422. These wrappers turn every rejection into a 400 carrying
//! `{ "error": ... }` like the rest of the API.

use axum::{
    extract::{FromRequest, FromRequestParts, OptionalFromRequest, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use super::error::{api_error, ApiError};

/// JSON request body.
///
/// As `Option<ApiJson<T>>` the body may be left out entirely (no
/// `Content-Type`), but a body that is sent must still parse.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<S, T> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let body = <Json<T> as OptionalFromRequest<S>>::from_request(req, state)
            .await
            .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))?;
        Ok(body.map(|Json(value)| Self(value)))
    }
}

/// Path parameters.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = <Path<T> as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))?;
        Ok(Self(value))
    }
}
