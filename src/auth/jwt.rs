//! JWT Token Handler
//! Mission: Issue and validate HS256 session tokens bound to the process secret

use crate::auth::models::{Claims, User};
use crate::config::SigningSecret;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::fmt;
use tracing::debug;

/// Session lifetime for tokens issued at login
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid(String),
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token expired"),
            TokenError::Invalid(reason) => write!(f, "Invalid token: {}", reason),
            TokenError::Signing(reason) => write!(f, "Failed to generate token: {}", reason),
        }
    }
}

impl std::error::Error for TokenError {}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtHandler {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Claims for a fresh session: issued now, expiring after the TTL
    pub fn claims_for(&self, user: &User) -> Claims {
        let now = Utc::now();
        Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        }
    }

    /// Sign arbitrary claims
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Generate a session token for a user
    pub fn generate_token(&self, user: &User) -> Result<(String, Claims), TokenError> {
        let claims = self.claims_for(user);
        let token = self.issue(&claims)?;

        debug!(
            user_id = user.id,
            role = %user.role,
            "Issued session token, expires in {}h",
            TOKEN_TTL_HOURS
        );

        Ok((token, claims))
    }

    /// Check signature, algorithm and expiry, then hand back the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
