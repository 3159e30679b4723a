//! Bearer authentication for the protected routes.

use std::sync::Arc;

use apikit::ApiError;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::contract::model::AuthenticatedUser;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the access token to an [`AuthenticatedUser`] stored in request extensions.
pub async fn require_auth(
    State(svc): State<Arc<Service>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(req.headers()) else {
        return Err(DomainError::unauthorized("missing bearer token").into());
    };
    let caller = svc.authenticate(token).await?;
    tracing::Span::current().record("user_id", tracing::field::display(caller.id));
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// The authenticated caller, as resolved by [`require_auth`].
#[derive(Debug, Clone)]
pub struct Caller(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| DomainError::unauthorized("not authenticated").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        h
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer  xyz ")), Some("xyz"));
    }

    #[test]
    fn other_schemes_and_blanks_are_ignored() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
