//! Authentication Module
//! Mission: Credential storage, password hashing, session tokens and the bearer-token gate

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, CurrentUser};
pub use password::PasswordHasher;
pub use user_store::{CredentialStore, UserStore};
