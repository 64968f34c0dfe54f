//! Authentication API Endpoints
//! Mission: Login, account creation, employee listing and deletion

use crate::auth::{
    jwt::JwtHandler,
    middleware::CurrentUser,
    models::{CreateAccountRequest, EmployeeSummary, LoginRequest, LoginResponse, User, UserRole},
    password::{PasswordError, PasswordHasher, MAX_PASSWORD_BYTES},
    user_store::{CreateUserError, CredentialStore},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<dyn CredentialStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub hasher: Arc<PasswordHasher>,
}

impl AuthState {
    pub fn new(
        user_store: Arc<dyn CredentialStore>,
        jwt_handler: Arc<JwtHandler>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            user_store,
            jwt_handler,
            hasher,
        }
    }
}

/// `{"data": [...]}` envelope for listings
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Welcome endpoint - GET /
pub async fn welcome() -> Json<&'static str> {
    Json("Welcome to tusk API")
}

/// Login endpoint - POST /users/login
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    let Json(payload) = payload?;

    let Some(user) = state.user_store.find_by_email(&payload.email).map_err(|e| {
        error!("User lookup failed: {:#}", e);
        AuthApiError::Internal(e.to_string())
    })?
    else {
        state.hasher.verify_absent(&payload.password);
        warn!("❌ Failed login attempt: {}", payload.email);
        return Err(AuthApiError::InvalidCredentials);
    };

    let valid = match state.hasher.verify(&payload.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(PasswordError::MalformedHash) => {
            error!("Stored hash for user {} is malformed", user.id);
            false
        }
        Err(e) => return Err(AuthApiError::Internal(e.to_string())),
    };

    if !valid {
        warn!("❌ Failed login attempt: {}", payload.email);
        return Err(AuthApiError::InvalidCredentials);
    }

    let (token, _claims) = state.jwt_handler.generate_token(&user).map_err(|e| {
        error!("Token signing failed: {}", e);
        AuthApiError::Internal("Failed generate token".to_string())
    })?;

    info!("✅ Login successful: {} ({})", user.email, user.role);

    Ok(Json(LoginResponse { user, token }))
}

/// Create account - POST /users
pub async fn create_account(
    State(state): State<AuthState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AuthApiError> {
    let Json(payload) = payload?;

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    if payload.password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthApiError::Validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    // Fast path; the UNIQUE constraint below is what actually guarantees it
    if state
        .user_store
        .find_by_email(&payload.email)
        .map_err(|e| AuthApiError::Internal(e.to_string()))?
        .is_some()
    {
        return Err(AuthApiError::EmailAlreadyExists);
    }

    let password_hash = state
        .hasher
        .hash(&payload.password)
        .map_err(|e| AuthApiError::Internal(e.to_string()))?;

    let user = state
        .user_store
        .create_user(
            &payload.email,
            &payload.name,
            &password_hash,
            UserRole::Employee,
        )
        .map_err(|e| match e {
            CreateUserError::EmailTaken => AuthApiError::EmailAlreadyExists,
            CreateUserError::Storage(e) => {
                error!("Failed to create user: {:#}", e);
                AuthApiError::Internal(e.to_string())
            }
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete user - DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AuthState>,
    CurrentUser(caller): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AuthApiError> {
    let id: i64 = user_id
        .parse()
        .map_err(|_| AuthApiError::Validation("Invalid user ID".to_string()))?;

    let deleted = state.user_store.delete_user(id).map_err(|e| {
        error!("Failed to delete user {}: {:#}", id, e);
        AuthApiError::Internal(e.to_string())
    })?;

    if !deleted {
        return Err(AuthApiError::UserNotFound);
    }

    info!("🗑️  User {} deleted by {} ({})", id, caller.user_id, caller.role);

    Ok(Json(json!({ "Message": "Deleted Successfully" })))
}

/// List employees - GET /api/users/employee
pub async fn list_employees(
    State(state): State<AuthState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<DataEnvelope<Vec<EmployeeSummary>>>, AuthApiError> {
    let employees = state
        .user_store
        .list_by_role(UserRole::Employee)
        .map_err(|e| {
            error!("Failed to list employees: {:#}", e);
            AuthApiError::Internal(e.to_string())
        })?;

    if employees.is_empty() {
        return Err(AuthApiError::NoEmployees);
    }

    tracing::debug!(
        caller = caller.user_id,
        count = employees.len(),
        "Listed employees"
    );

    Ok(Json(DataEnvelope { data: employees }))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    Validation(String),
    EmailAlreadyExists,
    InvalidCredentials,
    UserNotFound,
    NoEmployees,
    Internal(String),
}

impl From<JsonRejection> for AuthApiError {
    fn from(rejection: JsonRejection) -> Self {
        AuthApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthApiError::Validation(reason) => (StatusCode::BAD_REQUEST, json!({ "error": reason })),
            AuthApiError::EmailAlreadyExists => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Email Already Exists" }),
            ),
            AuthApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Email or Password is Wrong" }),
            ),
            AuthApiError::UserNotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": "Data not found" }))
            }
            AuthApiError::NoEmployees => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Data Employee not found" }),
            ),
            AuthApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_api_error_responses() {
        let cases = [
            (AuthApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AuthApiError::EmailAlreadyExists, StatusCode::BAD_REQUEST),
            (AuthApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthApiError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthApiError::NoEmployees, StatusCode::NOT_FOUND),
            (
                AuthApiError::Internal("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_surfaces_message() {
        let response = AuthApiError::Internal("database is locked".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "database is locked");
    }
}
