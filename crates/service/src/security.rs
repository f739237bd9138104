//! Caller identity passed into service operations.

use serde::{Deserialize, Serialize};

use models::role::Role;
use crate::errors::ServiceError;

/// An authenticated caller and the authorities granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub authorities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecurityContext {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl SecurityContext {
    pub fn anonymous() -> Self { Self::Anonymous }

    pub fn authenticated(username: impl Into<String>, authorities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Authenticated(Principal {
            username: username.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        })
    }

    /// Context for a user holding exactly its role's authority.
    pub fn for_role(username: impl Into<String>, role: Role) -> Self {
        Self::authenticated(username, [role.as_str()])
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SecurityContext::Anonymous => None,
            SecurityContext::Authenticated(p) => Some(p),
        }
    }

    pub fn is_authenticated(&self) -> bool { self.principal().is_some() }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.principal()
            .map(|p| p.authorities.iter().any(|a| a == authority))
            .unwrap_or(false)
    }

    /// Fails with not-authorized unless the caller holds one of `roles`.
    pub fn require_any_role(&self, roles: &[Role]) -> Result<&Principal, ServiceError> {
        let principal = self
            .principal()
            .ok_or_else(|| ServiceError::not_authorized("User", "Authentication required"))?;
        if roles.iter().any(|r| self.has_authority(r.as_str())) {
            Ok(principal)
        } else {
            Err(ServiceError::not_authorized(
                "User",
                format!("User {} lacks the required role", principal.username),
            ))
        }
    }
}
