use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::role::Role;
use crate::client;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uuid: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Client,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Client => Entity::has_one(client::Entity).into() }
    }
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef { Relation::Client.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields required to insert a user; `password_hash` is already encoded.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(ModelError::Validation("username must be 3 to 64 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(ModelError::Validation("username may only contain letters, digits, '_', '.', '-'".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ModelError::Validation("invalid email".into()));
    };
    if local.is_empty() || email.len() > 255 || email.chars().any(char::is_whitespace) {
        return Err(ModelError::Validation("invalid email".into()));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ModelError::Validation("invalid email domain".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.chars().count() < 8 {
        return Err(ModelError::Validation("password too short (>=8)".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(conn: &C, new: NewUser) -> Result<Model, ModelError> {
    validate_username(&new.username)?;
    validate_email(&new.email)?;
    if new.password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        uuid: Set(Uuid::new_v4().to_string()),
        username: Set(new.username),
        email: Set(new.email),
        password: Set(new.password_hash),
        role: Set(new.role),
        is_active: Set(new.is_active),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(conn).await?)
}
