//! Authentication Middleware
//! Mission: Protect /api routes with bearer-token validation

use crate::auth::{jwt::JwtHandler, models::AuthContext};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Auth middleware that validates JWT tokens
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidFormat)?;

    let claims = jwt_handler.verify(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        AuthError::InvalidToken
    })?;

    let ctx = AuthContext::from(&claims);
    req.extensions_mut().insert(ctx);

    // Echoed on the response so outer layers can log the caller
    let mut response = next.run(req).await;
    response.extensions_mut().insert(ctx);

    Ok(response)
}

/// Handler extractor for the identity the gate attached
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .map(CurrentUser)
            .ok_or(AuthError::MissingToken)
    }
}

/// Auth error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization header required",
            AuthError::InvalidFormat => "Invalid Token Format",
            AuthError::InvalidToken => "Invalid Token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.message() })),
        )
            .into_response()
    }
}
