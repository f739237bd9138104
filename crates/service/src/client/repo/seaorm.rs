use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, TransactionTrait,
};

use models::{client, personal_info, user};

use crate::client::domain::{ClientRecord, ClientUpdate, NewClient};
use crate::client::filters::{last_name_condition, name_condition, ClientFilters};
use crate::client::repository::ClientRepository;
use crate::errors::ServiceError;
use crate::pagination::{ClientSortField, Paginated, Pagination, Sort, SortDirection};

pub struct SeaOrmClientRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmClientRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// Clients joined to their user (inner) and personal info (left) so filters can reach every column.
fn joined() -> Select<client::Entity> {
    client::Entity::find()
        .join(JoinType::InnerJoin, client::Relation::User.def())
        .join(JoinType::LeftJoin, client::Relation::PersonalInfo.def())
}

fn ordered(select: Select<client::Entity>, sort: Sort) -> Select<client::Entity> {
    let order = match sort.direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    let select = select.order_by(sort.field.column(), order);
    if sort.field == ClientSortField::Id { select } else { select.order_by_asc(client::Column::Id) }
}

/// Attach users and personal infos to a batch of clients with two `IN` queries.
async fn hydrate<C: ConnectionTrait>(conn: &C, clients: Vec<client::Model>) -> Result<Vec<ClientRecord>, ServiceError> {
    if clients.is_empty() {
        return Ok(Vec::new());
    }
    let user_ids: Vec<i64> = clients.iter().map(|c| c.user_id).collect();
    let client_ids: Vec<i64> = clients.iter().map(|c| c.id).collect();

    let mut users: HashMap<i64, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let mut infos: HashMap<i64, personal_info::Model> = personal_info::Entity::find()
        .filter(personal_info::Column::ClientId.is_in(client_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.client_id, p))
        .collect();

    clients
        .into_iter()
        .map(|c| {
            let user = users
                .remove(&c.user_id)
                .ok_or_else(|| ServiceError::Db(format!("client {} has no user row", c.id)))?;
            let personal_info = infos.remove(&c.id);
            Ok(ClientRecord { client: c, user, personal_info })
        })
        .collect()
}

async fn hydrate_one<C: ConnectionTrait>(conn: &C, found: Option<client::Model>) -> Result<Option<ClientRecord>, ServiceError> {
    match found {
        Some(c) => Ok(hydrate(conn, vec![c]).await?.pop()),
        None => Ok(None),
    }
}

impl SeaOrmClientRepository {
    async fn find_one(&self, cond: Condition) -> Result<Option<ClientRecord>, ServiceError> {
        let found = joined().filter(cond).one(&self.db).await?;
        hydrate_one(&self.db, found).await
    }

    async fn find_many(&self, cond: Condition, sort: Sort) -> Result<Vec<ClientRecord>, ServiceError> {
        let rows = ordered(joined().filter(cond), sort).all(&self.db).await?;
        hydrate(&self.db, rows).await
    }
}

#[async_trait]
impl ClientRepository for SeaOrmClientRepository {
    async fn username_exists(&self, username: &str) -> Result<bool, ServiceError> {
        let n = user::Entity::find().filter(user::Column::Username.eq(username)).count(&self.db).await?;
        Ok(n > 0)
    }

    async fn user_email_exists(&self, email: &str) -> Result<bool, ServiceError> {
        let n = user::Entity::find().filter(user::Column::Email.eq(email)).count(&self.db).await?;
        Ok(n > 0)
    }

    async fn personal_info_by_phone(&self, phone: &str) -> Result<Option<personal_info::Model>, ServiceError> {
        Ok(personal_info::Entity::find().filter(personal_info::Column::Phone.eq(phone)).one(&self.db).await?)
    }

    async fn personal_info_by_email(&self, email: &str) -> Result<Option<personal_info::Model>, ServiceError> {
        Ok(personal_info::Entity::find().filter(personal_info::Column::Email.eq(email)).one(&self.db).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ClientRecord>, ServiceError> {
        let found = client::Entity::find_by_id(id).one(&self.db).await?;
        hydrate_one(&self.db, found).await
    }

    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<ClientRecord>, ServiceError> {
        self.find_one(Condition::all().add(client::Column::Uuid.eq(uuid))).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<ClientRecord>, ServiceError> {
        self.find_one(Condition::all().add(user::Column::Username.eq(username))).await
    }

    async fn find_by_vat(&self, vat: &str) -> Result<Option<ClientRecord>, ServiceError> {
        self.find_one(Condition::all().add(client::Column::Vat.eq(vat))).await
    }

    async fn insert(&self, new: NewClient) -> Result<ClientRecord, ServiceError> {
        let txn = self.db.begin().await?;
        let user = user::create(&txn, new.user).await.map_err(|e| ServiceError::from_model("User", e))?;
        let client = client::create(&txn, user.id, new.vat).await.map_err(|e| ServiceError::from_model("Client", e))?;
        let info = personal_info::create(&txn, client.id, new.personal_info)
            .await
            .map_err(|e| ServiceError::from_model("PersonalInfo", e))?;
        txn.commit().await?;
        Ok(ClientRecord { client, user, personal_info: Some(info) })
    }

    async fn update(&self, existing: ClientRecord, changes: ClientUpdate) -> Result<ClientRecord, ServiceError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.db.begin().await?;

        let mut am: client::ActiveModel = existing.client.into();
        if let Some(vat) = changes.vat.clone() {
            am.vat = Set(Some(vat));
        }
        am.updated_at = Set(now);
        let client = am.update(&txn).await.map_err(|e| ServiceError::from_model("Client", e.into()))?;

        let user = match changes.is_active {
            Some(active) => {
                let mut am: user::ActiveModel = existing.user.into();
                am.is_active = Set(active);
                am.updated_at = Set(now);
                am.update(&txn).await.map_err(|e| ServiceError::from_model("User", e.into()))?
            }
            None => existing.user,
        };

        let personal_info = match (existing.personal_info, changes.touches_personal_info()) {
            (Some(current), true) => {
                let mut am: personal_info::ActiveModel = current.into();
                if let Some(v) = changes.first_name { am.first_name = Set(v); }
                if let Some(v) = changes.last_name { am.last_name = Set(v); }
                if let Some(v) = changes.email { am.email = Set(Some(v)); }
                if let Some(v) = changes.phone { am.phone = Set(Some(v)); }
                if let Some(v) = changes.address { am.address = Set(Some(v)); }
                am.updated_at = Set(now);
                Some(am.update(&txn).await.map_err(|e| ServiceError::from_model("PersonalInfo", e.into()))?)
            }
            (None, true) => {
                let new = personal_info::NewPersonalInfo {
                    first_name: changes.first_name.unwrap_or_default(),
                    last_name: changes.last_name.unwrap_or_default(),
                    email: changes.email,
                    phone: changes.phone,
                    address: changes.address,
                };
                let created = personal_info::create(&txn, client.id, new)
                    .await
                    .map_err(|e| ServiceError::from_model("PersonalInfo", e))?;
                Some(created)
            }
            (current, false) => current,
        };

        txn.commit().await?;
        Ok(ClientRecord { client, user, personal_info })
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = client::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn find_page(&self, filters: &ClientFilters, pagination: Pagination, sort: Sort) -> Result<Paginated<ClientRecord>, ServiceError> {
        let (page, per_page) = pagination.normalize();
        let paginator = ordered(joined().filter(filters.to_condition()), sort).paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page).await?;
        let data = hydrate(&self.db, rows).await?;
        Ok(Paginated::new(data, total, pagination))
    }

    async fn find_all(&self, filters: &ClientFilters, sort: Sort) -> Result<Vec<ClientRecord>, ServiceError> {
        self.find_many(filters.to_condition(), sort).await
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<ClientRecord>, ServiceError> {
        self.find_many(name_condition(fragment), Sort::default()).await
    }

    async fn find_by_last_name(&self, fragment: &str) -> Result<Vec<ClientRecord>, ServiceError> {
        self.find_many(last_name_condition(fragment), Sort::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, unique_suffix};
    use models::role::Role;

    fn new_client(tag: &str, vat: Option<&str>, first: &str, last: &str) -> NewClient {
        NewClient {
            user: user::NewUser {
                username: format!("repo_{tag}"),
                email: format!("repo_{tag}@example.com"),
                password_hash: "plain:Secret123".into(),
                role: Role::Client,
                is_active: true,
            },
            vat: vat.map(str::to_string),
            personal_info: personal_info::NewPersonalInfo {
                first_name: first.into(),
                last_name: last.into(),
                email: Some(format!("pi_{tag}@example.com")),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn insert_find_update_delete() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmClientRepository::new(db);
        let tag = unique_suffix();
        let vat = format!("R{}", &tag[..12]);

        let rec = repo.insert(new_client(&tag, Some(&vat), "Eleni", "Georgiou")).await.unwrap();
        assert_eq!(repo.find_by_vat(&vat).await.unwrap().unwrap().client.id, rec.client.id);
        assert_eq!(repo.find_by_username(&rec.user.username).await.unwrap().unwrap().client.id, rec.client.id);
        assert!(repo.find_by_uuid(&rec.client.uuid).await.unwrap().is_some());

        let changes = ClientUpdate { address: Some("Athens".into()), is_active: Some(false), ..Default::default() };
        let updated = repo.update(rec.clone(), changes).await.unwrap();
        assert_eq!(updated.personal_info.unwrap().address.as_deref(), Some("Athens"));
        assert!(!updated.user.is_active);

        assert!(repo.delete(rec.client.id).await.unwrap());
        assert!(repo.find_by_id(rec.client.id).await.unwrap().is_none());
        assert!(!repo.delete(rec.client.id).await.unwrap());
    }

    #[tokio::test]
    async fn failed_user_update_rolls_back_client_changes() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmClientRepository::new(db);
        let tag = unique_suffix();
        let vat = format!("U{}", &tag[..12]);
        let rec = repo.insert(new_client(&tag, Some(&vat), "Nikos", "Dimou")).await.unwrap();

        let mut stale = rec.clone();
        stale.user.id = -1;
        let changes = ClientUpdate { vat: Some(format!("V{}", &tag[..12])), is_active: Some(false), ..Default::default() };
        let err = repo.update(stale, changes).await.unwrap_err();
        assert!(!matches!(err, ServiceError::AlreadyExists { entity: "Client", .. }), "{err:?}");

        let reloaded = repo.find_by_id(rec.client.id).await.unwrap().unwrap();
        assert_eq!(reloaded.client.vat.as_deref(), Some(vat.as_str()));
        assert!(reloaded.user.is_active);
        assert!(repo.delete(rec.client.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_vat_rolls_back_whole_insert() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmClientRepository::new(db);
        let tag = unique_suffix();
        let vat = format!("D{}", &tag[..12]);
        repo.insert(new_client(&tag, Some(&vat), "A", "B")).await.unwrap();

        let second = format!("{tag}x");
        let err = repo.insert(new_client(&second, Some(&vat), "C", "D")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { entity: "Client", .. }));
        assert!(!repo.username_exists(&format!("repo_{second}")).await.unwrap());
    }

    #[tokio::test]
    async fn filtered_page_and_name_search() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmClientRepository::new(db);
        let tag = unique_suffix();
        let last = format!("Zq{}", &tag[..8]);
        for i in 0..3 {
            repo.insert(new_client(&format!("{tag}{i}"), None, &format!("Nikos{i}"), &last)).await.unwrap();
        }

        let filters = ClientFilters { last_name: Some(last.to_lowercase()), ..Default::default() };
        let sort = Sort::new(ClientSortField::Id, SortDirection::Desc);
        let page = repo.find_page(&filters, Pagination::new(0, 2), sort).await.unwrap();
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 2);
        assert!(page.data[0].client.id > page.data[1].client.id);

        let hits = repo.search_by_name(&format!("nikos1 {}", last.to_uppercase())).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(repo.find_by_last_name(&last).await.unwrap().len(), 3);
        assert_eq!(repo.find_all(&filters, Sort::default()).await.unwrap().len(), 3);
    }
}
