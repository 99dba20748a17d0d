//! Extractors that reject with the `{"error": ..}` envelope.
//!
//! axum's own `Json` and `Path` answer malformed input with plain-text
//! bodies; these wrappers map every rejection to `400 Bad Request`.

use crate::error::ApiError;
use axum::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use log::warn;
use serde::de::DeserializeOwned;

/// JSON request body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

/// Typed path parameters, e.g. a uuid segment.
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        let message = match value {
            JsonRejection::JsonDataError(_) => "invalid JSON data",
            JsonRejection::JsonSyntaxError(_) => "malformed JSON",
            JsonRejection::MissingJsonContentType(_) => {
                "missing or invalid content-type, expected application/json"
            }
            _ => "invalid JSON request",
        };
        warn!("event=request_rejected module=server status=rejected reason=json_body");
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        warn!("event=request_rejected module=server status=rejected reason=path_param");
        ApiError::new(StatusCode::BAD_REQUEST, value.body_text())
    }
}
