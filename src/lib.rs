//! Tusk Backend Library
//!
//! User management API: login, account creation, employee listing and deletion,
//! guarded by HS256 bearer tokens.
//! Exposes the modules for the `tusk` binary and the integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::auth::{AuthState, JwtHandler, PasswordHasher, UserStore};
use crate::config::Config;

/// Open the user store, seed the owner and wire up hashing and token handling.
///
/// Any failure here is fatal to startup.
pub fn init_auth(config: &Config) -> Result<AuthState> {
    let hasher = PasswordHasher::new(config.bcrypt_cost).context("Invalid bcrypt cost")?;

    let user_store = UserStore::new(&config.database_path)?;
    user_store
        .seed_owner(&config.owner, &hasher)
        .context("Failed to seed owner account")?;

    let jwt_handler = JwtHandler::new(&config.jwt_secret);

    info!(
        "🔐 Authentication initialized at: {}",
        config.database_path.display()
    );

    Ok(AuthState::new(
        Arc::new(user_store),
        Arc::new(jwt_handler),
        Arc::new(hasher),
    ))
}
