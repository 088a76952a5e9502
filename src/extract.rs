// Input parsing shared by every handler. Failures here abort the request before any service call.

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// `Query<T>` whose rejection is the API error envelope
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

/// `Path<T>` whose rejection is the API error envelope
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}

/// Raw request body, decoded later by [`parse_body`] once the caller is authorized
#[derive(Debug)]
pub struct ApiBody(pub Bytes);

#[async_trait]
impl<S> FromRequest<S> for ApiBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        Ok(ApiBody(bytes))
    }
}

/// Raw path segments by route parameter name
pub type PathParams = HashMap<String, String>;

/// Numeric id from the `primary` path parameter, or `fallback` for routes still declared with the legacy name
pub fn parse_id(params: &PathParams, primary: &str, fallback: &str) -> Result<u64, ApiError> {
    let raw = params
        .get(primary)
        .or_else(|| params.get(fallback))
        .ok_or_else(ApiError::invalid_id)?;

    parse_u64(raw)
}

/// Numeric id from the conventional `id` parameter
pub fn path_id(params: &PathParams) -> Result<u64, ApiError> {
    parse_id(params, "id", "id")
}

/// Optional numeric query parameter; present-but-malformed is an error, absent is `None`
pub fn parse_optional_id(raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => parse_u64(value).map(Some),
    }
}

/// Enumerated query parameter with a fixed default when absent
pub fn parse_or_default<T: FromStr>(raw: Option<&str>, default: T, invalid: &str) -> Result<T, ApiError> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| ApiError::bad_request(invalid)),
    }
}

fn parse_u64(raw: &str) -> Result<u64, ApiError> {
    raw.trim().parse::<u64>().map_err(|_| ApiError::invalid_id())
}

/// Decode the JSON body into `T` and run its field rules; any failure surfaces the decoder's message
pub fn parse_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_slice(body).map_err(|e| ApiError::invalid_data(e.to_string()))?;
    value.validate().map_err(|e| ApiError::invalid_data(e.to_string()))?;
    Ok(value)
}
