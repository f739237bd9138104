use async_trait::async_trait;

use super::domain::Credentials;
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use models::role::Role;
    use crate::auth::domain::AuthUser;

    #[derive(Default)]
    pub struct MockAuthRepository {
        creds: Mutex<HashMap<String, Credentials>>, // key: username
    }

    impl MockAuthRepository {
        /// Store a user with an already-encoded password.
        pub fn insert(&self, username: &str, password_hash: String, role: Role, is_active: bool) -> AuthUser {
            let mut creds = self.creds.lock().unwrap();
            let user = AuthUser { id: creds.len() as i64 + 1, username: username.to_string(), role, is_active };
            creds.insert(username.to_string(), Credentials { user: user.clone(), password_hash });
            user
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(username).cloned())
        }
    }
}
