use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{personal_info, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uuid: String,
    #[sea_orm(unique)]
    pub vat: Option<String>,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    PersonalInfo,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::PersonalInfo => Entity::has_one(personal_info::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<personal_info::Entity> for Entity {
    fn to() -> RelationDef { Relation::PersonalInfo.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// VAT numbers are 1 to 20 ASCII letters or digits.
pub fn validate_vat(vat: &str) -> Result<(), ModelError> {
    if vat.is_empty() || vat.len() > 20 || !vat.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ModelError::Validation("vat must be 1 to 20 letters or digits".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(conn: &C, user_id: i64, vat: Option<String>) -> Result<Model, ModelError> {
    if let Some(v) = vat.as_deref() { validate_vat(v)?; }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        uuid: Set(Uuid::new_v4().to_string()),
        vat: Set(vat),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(conn).await?)
}
