//! Password Hasher
//! Mission: Salted bcrypt hashing with comparisons that take the same time on every path

use bcrypt::{hash, verify};
use std::fmt;

pub use bcrypt::DEFAULT_COST;

/// Lowest and highest cost bcrypt accepts
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt only looks at the first 72 bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

const DUMMY_PASSWORD: &str = "tusk-timing-equalizer";

#[derive(Debug)]
pub enum PasswordError {
    CostOutOfRange(u32),
    Hashing(String),
    MalformedHash,
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordError::CostOutOfRange(cost) => write!(
                f,
                "bcrypt cost {} outside {}..={}",
                cost, MIN_COST, MAX_COST
            ),
            PasswordError::Hashing(reason) => write!(f, "Failed to hash password: {}", reason),
            PasswordError::MalformedHash => write!(f, "Stored password hash is malformed"),
        }
    }
}

impl std::error::Error for PasswordError {}

/// bcrypt hasher with a cost fixed at construction
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::CostOutOfRange(cost));
        }

        let dummy_hash =
            hash(DUMMY_PASSWORD, cost).map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password into a `$2b$` string with a fresh salt
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash(password, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Compare a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`. A hash bcrypt cannot parse is an error, but only after a full
    /// comparison against the dummy hash so that both outcomes cost the same.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        match verify(password, stored_hash) {
            Ok(valid) => Ok(valid),
            Err(_) => {
                self.verify_absent(password);
                Err(PasswordError::MalformedHash)
            }
        }
    }

    /// Spend one comparison for an account that does not exist.
    ///
    /// The dummy hash is built at the configured cost. Accounts hashed before a `BCRYPT_COST`
    /// change keep their old cost until the password is reset, so for them a wrong password
    /// and an unknown email no longer take the same time.
    pub fn verify_absent(&self, password: &str) {
        let _ = verify(password, &self.dummy_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST).expect("min cost is valid")
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = test_hasher();
        let stored = hasher.hash("correct horse").unwrap();

        assert_ne!(stored, "correct horse");
        assert!(stored.starts_with("$2"));
        assert!(hasher.verify("correct horse", &stored).unwrap());
    }

    #[test]
    fn test_wrong_password_is_false_not_error() {
        let hasher = test_hasher();
        let stored = hasher.hash("p4ssword").unwrap();

        for wrong in ["p4ssw0rd", "", "P4SSWORD", "p4ssword "] {
            assert!(!hasher.verify(wrong, &stored).unwrap(), "{wrong:?} matched");
        }
    }

    #[test]
    fn test_same_password_salts_differently() {
        let hasher = test_hasher();
        let first = hasher.hash("repeat").unwrap();
        let second = hasher.hash("repeat").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("repeat", &first).unwrap());
        assert!(hasher.verify("repeat", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = test_hasher();

        let result = hasher.verify("anything", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(PasswordError::MalformedHash)));
    }

    #[test]
    fn test_cost_is_validated() {
        assert!(matches!(
            PasswordHasher::new(3),
            Err(PasswordError::CostOutOfRange(3))
        ));
        assert!(matches!(
            PasswordHasher::new(32),
            Err(PasswordError::CostOutOfRange(32))
        ));
        assert_eq!(test_hasher().cost(), MIN_COST);
    }

    #[test]
    fn test_dummy_hash_uses_configured_cost() {
        let hasher = PasswordHasher::new(5).unwrap();

        assert!(hasher.dummy_hash.contains("$05$"), "{}", hasher.dummy_hash);
        assert!(!hasher.verify("tusk-timing-equalizer-not", &hasher.dummy_hash).unwrap());
    }

    #[test]
    fn test_hash_embeds_cost() {
        let hasher = test_hasher();
        let stored = hasher.hash("cost check").unwrap();

        assert!(stored.contains("$04$"), "unexpected hash layout: {stored}");
    }
}
