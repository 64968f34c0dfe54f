//! Request logging middleware.
//!
//! One event per request, keyed by the matched route template rather than the raw path,
//! so `/api/users/7` and `/api/users/8` group together. Gated requests also carry the
//! caller's user id.

use crate::auth::models::AuthContext;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let route = route_label(&request);

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let status = response.status().as_u16();
    let caller = caller_of(&response);

    if response.status().is_server_error() {
        warn!(%method, %route, status, latency_ms, ?caller, "Request failed");
    } else {
        info!(%method, %route, status, latency_ms, ?caller, "Request served");
    }

    response
}

/// Route template when the router matched one, raw path otherwise (404s, static files)
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// User id the auth gate attached, if the request went through it
fn caller_of(response: &Response) -> Option<i64> {
    response
        .extensions()
        .get::<AuthContext>()
        .map(|ctx| ctx.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_logging_passes_response_through() {
        let app = Router::new()
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(middleware::from_fn(request_logging));

        let response = app
            .oneshot(Request::builder().uri("/teapot").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_route_label_falls_back_to_path() {
        let request = Request::builder()
            .uri("/nowhere/42?x=1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(route_label(&request), "/nowhere/42");
    }

    #[test]
    fn test_caller_read_from_response() {
        let mut response = StatusCode::OK.into_response();
        assert_eq!(caller_of(&response), None);

        response.extensions_mut().insert(AuthContext {
            user_id: 11,
            role: UserRole::Admin,
        });
        assert_eq!(caller_of(&response), Some(11));
    }
}
