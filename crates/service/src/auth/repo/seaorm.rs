use sea_orm::{DatabaseConnection, EntityTrait, ColumnTrait, QueryFilter};

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, AuthError> {
        let res = models::user::Entity::find()
            .filter(models::user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| Credentials {
            user: AuthUser { id: u.id, username: u.username, role: u.role, is_active: u.is_active },
            password_hash: u.password,
        }))
    }
}
