use thiserror::Error;

use models::errors::ModelError;

/// Business errors surfaced by the service layer. `entity` names the object
/// the failure is about (`User`, `Client`, `PersonalInfo`).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    AlreadyExists { entity: &'static str, message: String },
    #[error("{message}")]
    NotFound { entity: &'static str, message: String },
    #[error("{message}")]
    InvalidArgument { entity: &'static str, message: String },
    #[error("{message}")]
    NotAuthorized { entity: &'static str, message: String },
    #[error("database error: {0}")]
    Db(String),
    #[error("hashing error: {0}")]
    Hash(String),
}

impl ServiceError {
    pub fn already_exists(entity: &'static str, message: impl Into<String>) -> Self {
        Self::AlreadyExists { entity, message: message.into() }
    }

    pub fn not_found(entity: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound { entity, message: message.into() }
    }

    pub fn invalid(entity: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument { entity, message: message.into() }
    }

    pub fn not_authorized(entity: &'static str, message: impl Into<String>) -> Self {
        Self::NotAuthorized { entity, message: message.into() }
    }

    /// Stable error code for external mapping, e.g. `ClientNotFound`.
    pub fn code(&self) -> String {
        match self {
            ServiceError::AlreadyExists { entity, .. } => format!("{entity}AlreadyExists"),
            ServiceError::NotFound { entity, .. } => format!("{entity}NotFound"),
            ServiceError::InvalidArgument { entity, .. } => format!("{entity}InvalidArgument"),
            ServiceError::NotAuthorized { entity, .. } => format!("{entity}NotAuthorized"),
            ServiceError::Db(_) => "DatabaseError".to_string(),
            ServiceError::Hash(_) => "HashError".to_string(),
        }
    }

    /// Attach an entity name to a model-level failure.
    pub fn from_model(entity: &'static str, e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::invalid(entity, msg),
            ModelError::Conflict(msg) => Self::already_exists(entity, msg),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::from_model("Client", ModelError::from(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_combine_entity_and_kind() {
        assert_eq!(ServiceError::not_found("Client", "x").code(), "ClientNotFound");
        assert_eq!(ServiceError::already_exists("User", "x").code(), "UserAlreadyExists");
        assert_eq!(ServiceError::not_authorized("User", "x").code(), "UserNotAuthorized");
        assert_eq!(ServiceError::Db("boom".into()).code(), "DatabaseError");
    }

    #[test]
    fn model_errors_keep_their_kind() {
        let e = ServiceError::from_model("PersonalInfo", ModelError::Validation("invalid phone number".into()));
        assert!(matches!(e, ServiceError::InvalidArgument { entity: "PersonalInfo", .. }));
        assert_eq!(e.to_string(), "invalid phone number");
    }

    #[test]
    fn conflicts_carry_the_failing_entity() {
        let e = ServiceError::from_model("User", ModelError::Conflict("duplicate key value".into()));
        assert_eq!(e.code(), "UserAlreadyExists");
        let e = ServiceError::from_model("PersonalInfo", ModelError::Conflict("duplicate key value".into()));
        assert_eq!(e.code(), "PersonalInfoAlreadyExists");
    }
}
