//! Request extractors: correlation id, bearer token, current user, and the
//! translated list query.

use crate::error::AppError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use trailbound_core::query::{ListQuery, QueryPlan};
use trailbound_core::{Actor, Error};

/// Correlation id assigned by the middleware, for handlers that want to
/// log or return it.
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self("unknown".to_string())))
    }
}

/// The raw bearer credential from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError(Error::unauthenticated(
                    "you are not logged in, please log in to get access",
                ))
            })?;
        let token = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError(Error::unauthenticated("malformed authorization header")))?;
        Ok(Self(token.to_string()))
    }
}

/// The authenticated actor, resolved through the state's auth provider.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let actor = state.auth.resolve(&token).await?;
        Ok(Self(actor))
    }
}

/// The request's query string translated into a [`QueryPlan`].
#[derive(Debug, Clone)]
pub struct ListParams(pub QueryPlan);

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.uri.query().unwrap_or_default();
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|_| AppError(Error::validation("malformed query string")))?;
        Ok(Self(ListQuery::new(pairs).translate()))
    }
}
