use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

/// One-way password encoding used when creating users and checking logins.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &str) -> Result<String, ServiceError>;
    fn matches(&self, raw: &str, encoded: &str) -> bool;
    /// Algorithm label stored alongside or logged with hashes.
    fn algorithm(&self) -> &'static str;
}

/// Argon2id with a random salt per hash, PHC string output.
#[derive(Default, Clone)]
pub struct Argon2PasswordEncoder;

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| ServiceError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        match PasswordHash::new(encoded) {
            Ok(parsed) => Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    fn algorithm(&self) -> &'static str { "argon2" }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_roundtrip_and_salting() {
        let enc = Argon2PasswordEncoder;
        let a = enc.encode("Secret123").unwrap();
        let b = enc.encode("Secret123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(enc.matches("Secret123", &a));
        assert!(!enc.matches("secret123", &a));
        assert!(!enc.matches("Secret123", "not-a-phc-string"));
    }
}
