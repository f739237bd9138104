use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::client;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "personal_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub client_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: Option<String>,
    #[sea_orm(unique)]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Client }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::belongs_to(client::Entity)
                .from(Column::ClientId)
                .to(client::Column::Id)
                .into(),
        }
    }
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef { Relation::Client.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default)]
pub struct NewPersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if name.chars().count() > 128 { return Err(ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

/// Digits with an optional leading '+'; spaces and dashes between digits are tolerated.
pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    let well_formed = body.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        && body.starts_with(|c: char| c.is_ascii_digit())
        && body.ends_with(|c: char| c.is_ascii_digit());
    if !well_formed || !(7..=20).contains(&digits) || phone.len() > 20 {
        return Err(ModelError::Validation("invalid phone number".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(conn: &C, client_id: i64, new: NewPersonalInfo) -> Result<Model, ModelError> {
    validate_name(&new.first_name)?;
    validate_name(&new.last_name)?;
    if let Some(p) = new.phone.as_deref() { validate_phone(p)?; }
    if let Some(e) = new.email.as_deref() { crate::user::validate_email(e)?; }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        client_id: Set(client_id),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        email: Set(new.email),
        phone: Set(new.phone),
        address: Set(new.address),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(conn).await?)
}
