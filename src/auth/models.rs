//! Authentication Models
//! Mission: Define user, claims and request/response shapes for the user API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User account as stored in the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub role: UserRole,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
    pub updated_at: String,
}

/// Binary role carried by every account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UserRole {
    Admin,
    Employee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Employee => "Employee",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(UserRole::Admin),
            "Employee" => Ok(UserRole::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Role string found in storage that maps to no known role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
    pub iat: usize, // issued-at, unix seconds
    pub exp: usize, // expiration, unix seconds
}

/// Identity attached to a request once the bearer token checks out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: UserRole,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user's public fields plus the session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// Account creation request body
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Row returned by the employee listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            role: UserRole::Employee,
            name: "Budi".to_string(),
            email: "budi@go.id".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
            updated_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_user_role_serialization() {
        let admin = serde_json::to_string(&UserRole::Admin).unwrap();
        assert_eq!(admin, r#""Admin""#);

        let employee: UserRole = serde_json::from_str(r#""Employee""#).unwrap();
        assert_eq!(employee, UserRole::Employee);
    }

    #[test]
    fn test_user_role_parsing_is_exact() {
        assert_eq!("Admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("Employee".parse::<UserRole>(), Ok(UserRole::Employee));
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["createdAt"], "2025-01-01T00:00:00+00:00");
        assert_eq!(json["role"], "Employee");
    }

    #[test]
    fn test_login_response_flattens_user() {
        let response = LoginResponse {
            user: sample_user(),
            token: "abc.def.ghi".to_string(),
        };
        let json = serde_json::to_value(response).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "budi@go.id");
        assert_eq!(json["token"], "abc.def.ghi");
    }
}
