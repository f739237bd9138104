use anyhow::Result;
use sea_orm::{EntityTrait, ModelTrait, QueryFilter, ColumnTrait};

use super::{test_db, unique_suffix};
use crate::errors::ModelError;
use crate::personal_info::{self, NewPersonalInfo};
use crate::role::Role;
use crate::user::{self, NewUser};
use crate::client;

fn new_user(suffix: &str) -> NewUser {
    NewUser {
        username: format!("crud_{suffix}"),
        email: format!("crud_{suffix}@example.com"),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
        role: Role::Client,
        is_active: true,
    }
}

#[tokio::test]
async fn test_client_graph_crud() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let suffix = unique_suffix();

    let u = user::create(&db, new_user(&suffix)).await?;
    assert_eq!(u.role, Role::Client);
    assert!(u.is_active);

    let c = client::create(&db, u.id, Some(format!("V{}", &suffix[..8]))).await?;
    assert_eq!(c.user_id, u.id);

    let pi = personal_info::create(&db, c.id, NewPersonalInfo {
        first_name: "Crud".into(),
        last_name: "Tester".into(),
        email: Some(format!("pi_{suffix}@example.com")),
        phone: None,
        address: Some("Patission 76".into()),
    }).await?;
    assert_eq!(pi.client_id, c.id);

    let owner = c.find_related(user::Entity).one(&db).await?;
    assert_eq!(owner.map(|o| o.id), Some(u.id));

    // deleting the client cascades to its personal info
    client::Entity::delete_by_id(c.id).exec(&db).await?;
    let orphan = personal_info::Entity::find()
        .filter(personal_info::Column::ClientId.eq(c.id))
        .one(&db)
        .await?;
    assert!(orphan.is_none());

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_maps_to_conflict() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let suffix = unique_suffix();

    let first = user::create(&db, new_user(&suffix)).await?;
    let mut dup = new_user(&suffix);
    dup.email = format!("other_{suffix}@example.com");
    let err = user::create(&db, dup).await.unwrap_err();
    assert!(matches!(err, ModelError::Conflict(_)), "unexpected error: {err}");

    user::Entity::delete_by_id(first.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let mut bad = new_user(&unique_suffix());
    bad.email = "not-an-email".into();
    let err = user::create(&db, bad).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    Ok(())
}
