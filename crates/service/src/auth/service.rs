use std::sync::Arc;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use tracing::{debug, info, instrument};

use models::role::Role;

use super::domain::{AuthSession, Claims, LoginInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use crate::password::PasswordEncoder;
use crate::security::SecurityContext;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    encoder: Arc<dyn PasswordEncoder>,
    cfg: AuthConfig,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, encoder: Arc<dyn PasswordEncoder>, cfg: AuthConfig) -> Self { Self { repo, encoder, cfg } }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::LoginInput;
    /// use service::password::{Argon2PasswordEncoder, PasswordEncoder};
    /// use models::role::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let hash = Argon2PasswordEncoder.encode("Passw0rd").unwrap();
    /// repo.insert("admin", hash, Role::Admin, true);
    /// let svc = AuthService::new(repo, Arc::new(Argon2PasswordEncoder), AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1 });
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "admin".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.username, "admin");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let cred = self.repo
            .find_credentials(input.username.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !self.encoder.matches(&input.password, &cred.password_hash) {
            debug!("password mismatch");
            return Err(AuthError::Unauthorized);
        }
        if !cred.user.is_active {
            return Err(AuthError::Inactive);
        }

        let token = self.issue_token(&cred.user.username, cred.user.role)?;
        info!(user_id = cred.user.id, role = %cred.user.role, "login_succeeded");
        Ok(AuthSession { user: cred.user, token })
    }

    /// Sign an HS256 token for `username` valid for the configured TTL.
    pub fn issue_token(&self, username: &str, role: Role) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
        let claims = Claims { sub: username.to_string(), role: role.as_str().to_string(), exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Resolve a bearer token into the caller's security context.
    pub fn authenticate(&self, token: &str) -> Result<SecurityContext, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let role: Role = data.claims.role.parse().map_err(|_| AuthError::InvalidToken("unknown role".into()))?;
        Ok(SecurityContext::for_role(data.claims.sub, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::password::testing::PlainPasswordEncoder;

    fn svc() -> AuthService<MockAuthRepository> {
        let repo = Arc::new(MockAuthRepository::default());
        repo.insert("root", "plain:Secret123".into(), Role::SuperAdmin, true);
        repo.insert("gone", "plain:Secret123".into(), Role::Client, false);
        let cfg = AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1 };
        AuthService::new(repo, Arc::new(PlainPasswordEncoder), cfg)
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn login_issues_token_that_authenticates() {
        let svc = svc();
        let session = svc.login(login("root", "Secret123")).await.unwrap();
        assert_eq!(session.user.role, Role::SuperAdmin);

        let ctx = svc.authenticate(&session.token).unwrap();
        assert_eq!(ctx.principal().unwrap().username, "root");
        assert!(ctx.has_authority("SUPER_ADMIN"));
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials_and_inactive_users() {
        let svc = svc();
        assert!(matches!(svc.login(login("root", "wrong")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(login("nobody", "Secret123")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(login("gone", "Secret123")).await, Err(AuthError::Inactive)));
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let svc = svc();
        let token = svc.issue_token("admin", Role::Admin).unwrap();
        assert!(svc.authenticate(&format!("{token}x")).is_err());

        let other = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            Arc::new(PlainPasswordEncoder),
            AuthConfig { jwt_secret: "another-secret".into(), token_ttl_hours: 1 },
        );
        assert!(matches!(other.authenticate(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let cfg = AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: -2 };
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), Arc::new(PlainPasswordEncoder), cfg);
        let token = svc.issue_token("admin", Role::Admin).unwrap();
        assert!(svc.authenticate(&token).is_err());
    }
}
