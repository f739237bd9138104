use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use models::role::Role;
use service::auth::{domain::LoginInput, repository::AuthRepository, AuthService};
use service::client::{repository::ClientRepository, ClientService};
use service::security::SecurityContext;

use crate::errors::ApiError;

pub const AUTH_COOKIE: &str = "auth_token";

/// Shared handler state. Services sit behind trait objects so tests can swap repositories.
#[derive(Clone)]
pub struct ServerState {
    pub clients: Arc<ClientService<dyn ClientRepository>>,
    pub auth: Arc<AuthService<dyn AuthRepository>>,
}

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: i64, pub username: String, pub role: Role, pub token: String }

/// Caller identity taken from `Authorization: Bearer <token>` or the `auth_token` cookie.
///
/// No token yields an anonymous context; a bad token is rejected with 401.
pub struct AuthContext(pub SecurityContext);

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

#[async_trait]
impl FromRequestParts<ServerState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(AUTH_COOKIE)
                .map(|c| c.value().to_string())
        });
        match token.filter(|t| !t.is_empty()) {
            None => Ok(AuthContext(SecurityContext::anonymous())),
            Some(t) => Ok(AuthContext(state.auth.authenticate(&t)?)),
        }
    }
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), ApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    let user = session.user;
    let out = LoginOutput { user_id: user.id, username: user.username, role: user.role, token: session.token };
    Ok((jar, Json(out)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Logged Out")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from(AUTH_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}
