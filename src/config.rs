//! Service configuration
//!
//! Every setting is a CLI flag with an environment fallback (`.env` is loaded before parsing).
//! [`Args`] is the raw surface; [`Config`] is the validated, immutable result handed to the
//! rest of the service at startup.

use crate::auth::password::{DEFAULT_COST, MAX_COST, MIN_COST};
use clap::Parser;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_OWNER_EMAIL: &str = "owner@go.id";
pub const DEFAULT_OWNER_NAME: &str = "Owner";
pub const DEFAULT_OWNER_PASSWORD: &str = "123456";

#[derive(Parser, Debug)]
#[command(name = "tusk")]
#[command(about = "Tusk user management API")]
pub struct Args {
    /// HMAC secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, env = "TUSK_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// SQLite database file holding the users table
    #[arg(long, env = "DATABASE_PATH", default_value = "tusk.db")]
    pub database_path: PathBuf,

    /// Directory served under /attachment
    #[arg(long, env = "ATTACHMENT_DIR", default_value = "./attachment")]
    pub attachment_dir: PathBuf,

    /// bcrypt cost factor
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Email of the seeded admin account
    #[arg(long, env = "OWNER_EMAIL", default_value = DEFAULT_OWNER_EMAIL)]
    pub owner_email: String,

    /// Display name of the seeded admin account
    #[arg(long, env = "OWNER_NAME", default_value = DEFAULT_OWNER_NAME)]
    pub owner_name: String,

    /// Password of the seeded admin account
    #[arg(long, env = "OWNER_PASSWORD", default_value = DEFAULT_OWNER_PASSWORD, hide_env_values = true)]
    pub owner_password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingSecret,
    InvalidBcryptCost(u32),
    EmptyOwnerEmail,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSecret => write!(f, "JWT_SECRET not set in environment"),
            ConfigError::InvalidBcryptCost(cost) => write!(
                f,
                "BCRYPT_COST {} outside {}..={}",
                cost, MIN_COST, MAX_COST
            ),
            ConfigError::EmptyOwnerEmail => write!(f, "OWNER_EMAIL must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Token signing key. Cannot be empty; never printed.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(raw.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Account seeded as Admin on first start
#[derive(Clone)]
pub struct OwnerAccount {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl OwnerAccount {
    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_OWNER_PASSWORD
    }
}

impl fmt::Debug for OwnerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerAccount")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub database_path: PathBuf,
    pub attachment_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub jwt_secret: SigningSecret,
    pub owner: OwnerAccount,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let jwt_secret = SigningSecret::new(args.jwt_secret.unwrap_or_default())?;

        if !(MIN_COST..=MAX_COST).contains(&args.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(args.bcrypt_cost));
        }

        if args.owner_email.trim().is_empty() {
            return Err(ConfigError::EmptyOwnerEmail);
        }

        Ok(Self {
            bind: args.bind,
            database_path: args.database_path,
            attachment_dir: args.attachment_dir,
            bcrypt_cost: args.bcrypt_cost,
            jwt_secret,
            owner: OwnerAccount {
                email: args.owner_email,
                name: args.owner_name,
                password: args.owner_password,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["tusk"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("args should parse")
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(SigningSecret::new("").unwrap_err(), ConfigError::MissingSecret);
        assert_eq!(
            SigningSecret::new("   \t").unwrap_err(),
            ConfigError::MissingSecret
        );
        assert!(SigningSecret::new("s3cr3t").is_ok());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SigningSecret::new("super-secret-value").unwrap();
        let printed = format!("{:?}", secret);

        assert!(!printed.contains("super-secret-value"));
    }

    #[test]
    fn test_config_requires_secret() {
        let parsed = Args {
            jwt_secret: None,
            ..args(&["--jwt-secret", "placeholder"])
        };

        let err = Config::try_from(parsed).unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret);
    }

    #[test]
    fn test_config_from_flags() {
        let config = Config::try_from(args(&[
            "--jwt-secret",
            "flag-secret",
            "--bind",
            "127.0.0.1:9000",
            "--bcrypt-cost",
            "4",
            "--owner-email",
            "boss@go.id",
        ]))
        .unwrap();

        assert_eq!(config.jwt_secret.as_bytes(), b"flag-secret");
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.owner.email, "boss@go.id");
        assert_eq!(config.owner.name, DEFAULT_OWNER_NAME);
        assert!(config.owner.uses_default_password());
    }

    #[test]
    fn test_config_rejects_bad_cost() {
        let err = Config::try_from(args(&["--jwt-secret", "x", "--bcrypt-cost", "2"]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBcryptCost(2));
    }
}
