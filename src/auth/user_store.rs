//! User Storage
//! Mission: Persist user accounts in SQLite, with email uniqueness enforced by the table itself

use crate::auth::models::{EmployeeSummary, User, UserRole};
use crate::auth::password::PasswordHasher;
use crate::config::OwnerAccount;
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        role TEXT NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
";

const USER_COLUMNS: &str = "id, role, name, email, password_hash, created_at, updated_at";

/// Why an insert did not produce a row
#[derive(Debug)]
pub enum CreateUserError {
    EmailTaken,
    Storage(anyhow::Error),
}

impl fmt::Display for CreateUserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateUserError::EmailTaken => write!(f, "Email Already Exists"),
            CreateUserError::Storage(e) => write!(f, "{:#}", e),
        }
    }
}

impl std::error::Error for CreateUserError {}

impl From<rusqlite::Error> for CreateUserError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, _) = &e {
            if err.code == ErrorCode::ConstraintViolation {
                return CreateUserError::EmailTaken;
            }
        }
        CreateUserError::Storage(e.into())
    }
}

/// Persistence seam for account lookups and mutations
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive email lookup
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, CreateUserError>;

    fn list_by_role(&self, role: UserRole) -> Result<Vec<EmployeeSummary>>;

    /// Returns false when no row had that id
    fn delete_user(&self, id: i64) -> Result<bool>;
}

/// User storage with SQLite backend
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    /// Open (or create) the database file and apply the schema
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open user database at {}", db_path.display()))?;
        Self::with_connection(conn)
    }

    /// In-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize users schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the Admin owner unless the owner's email is already registered.
    ///
    /// Returns true if a row was inserted.
    pub fn seed_owner(&self, owner: &OwnerAccount, hasher: &PasswordHasher) -> Result<bool> {
        if self.find_by_email(&owner.email)?.is_some() {
            info!("Owner Exist: {}", owner.email);
            return Ok(false);
        }

        let password_hash = hasher
            .hash(&owner.password)
            .context("Failed to hash owner password")?;

        match self.create_user(&owner.email, &owner.name, &password_hash, UserRole::Admin) {
            Ok(user) => {
                info!("🔐 Owner account created: {} (id {})", user.email, user.id);
                if owner.uses_default_password() {
                    warn!("⚠️  Owner is using the default password, change OWNER_PASSWORD in production!");
                }
                Ok(true)
            }
            Err(CreateUserError::EmailTaken) => Ok(false),
            Err(CreateUserError::Storage(e)) => Err(e.context("Failed to insert owner account")),
        }
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let role_str: String = row.get(1)?;
        let role = role_str.parse::<UserRole>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(User {
            id: row.get(0)?,
            role,
            name: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl CredentialStore for UserStore {
    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE email = ?1",
            USER_COLUMNS
        ))?;

        let user = stmt
            .query_row(params![email], Self::row_to_user)
            .optional()
            .context("Failed to look up user by email")?;

        Ok(user)
    }

    fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, CreateUserError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO users (role, name, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![role.as_str(), name, email, password_hash, now],
        )?;

        let user = User {
            id: conn.last_insert_rowid(),
            role,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        info!("✅ Created user: {} ({})", user.email, user.role);

        Ok(user)
    }

    fn list_by_role(&self, role: UserRole) -> Result<Vec<EmployeeSummary>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, name, email FROM users WHERE role = ?1 ORDER BY id")?;

        let rows = stmt
            .query_map(params![role.as_str()], |row| {
                Ok(EmployeeSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list users by role")?;

        Ok(rows)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows_affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;

        if rows_affected > 0 {
            info!("🗑️  Deleted user: {}", id);
        }

        Ok(rows_affected > 0)
    }
}
