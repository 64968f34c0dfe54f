use crate::auth::{api as auth_api, auth_middleware, AuthState};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Full application router.
///
/// Everything under `/api` sits behind the bearer-token gate. Attachments are only mounted
/// when a directory is given.
pub fn build_router(state: AuthState, attachment_dir: Option<&Path>) -> Router {
    let public_routes = Router::new()
        .route("/", get(auth_api::welcome))
        .route("/users/login", post(auth_api::login))
        .route("/users", post(auth_api::create_account));

    let protected_routes = Router::new()
        .route("/users/employee", get(auth_api::list_employees))
        .route("/users/:id", delete(auth_api::delete_user))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_handler.clone(),
            auth_middleware,
        ));

    let mut app = Router::new()
        .merge(public_routes)
        .nest("/api", protected_routes)
        .with_state(state);

    if let Some(dir) = attachment_dir {
        app = app.nest_service("/attachment", ServeDir::new(dir));
    }

    app.layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}
