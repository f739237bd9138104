use async_trait::async_trait;

use models::personal_info;

use super::domain::{ClientRecord, ClientUpdate, NewClient};
use super::filters::ClientFilters;
use crate::errors::ServiceError;
use crate::pagination::{Paginated, Pagination, Sort};

/// Repository abstraction for client persistence.
///
/// Multi-row writes (`insert`, `update`) are atomic: either every row changes or none does.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn username_exists(&self, username: &str) -> Result<bool, ServiceError>;
    async fn user_email_exists(&self, email: &str) -> Result<bool, ServiceError>;
    async fn personal_info_by_phone(&self, phone: &str) -> Result<Option<personal_info::Model>, ServiceError>;
    async fn personal_info_by_email(&self, email: &str) -> Result<Option<personal_info::Model>, ServiceError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ClientRecord>, ServiceError>;
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<ClientRecord>, ServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<ClientRecord>, ServiceError>;
    async fn find_by_vat(&self, vat: &str) -> Result<Option<ClientRecord>, ServiceError>;

    async fn insert(&self, new: NewClient) -> Result<ClientRecord, ServiceError>;
    async fn update(&self, existing: ClientRecord, changes: ClientUpdate) -> Result<ClientRecord, ServiceError>;
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;

    async fn find_page(&self, filters: &ClientFilters, pagination: Pagination, sort: Sort) -> Result<Paginated<ClientRecord>, ServiceError>;
    async fn find_all(&self, filters: &ClientFilters, sort: Sort) -> Result<Vec<ClientRecord>, ServiceError>;
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<ClientRecord>, ServiceError>;
    async fn find_by_last_name(&self, fragment: &str) -> Result<Vec<ClientRecord>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use models::{client, user};
    use crate::client::filters::{last_name_matches, name_matches};
    use crate::pagination::{ClientSortField, SortDirection};

    #[derive(Default)]
    struct Tables {
        next_id: i64,
        users: BTreeMap<i64, user::Model>,
        clients: BTreeMap<i64, client::Model>,
        infos: BTreeMap<i64, personal_info::Model>, // key: client_id
    }

    impl Tables {
        fn next_id(&mut self) -> i64 {
            self.next_id += 1;
            self.next_id
        }

        fn record(&self, c: &client::Model) -> Option<ClientRecord> {
            let user = self.users.get(&c.user_id)?.clone();
            Some(ClientRecord { client: c.clone(), user, personal_info: self.infos.get(&c.id).cloned() })
        }

        fn records(&self) -> Vec<ClientRecord> {
            self.clients.values().filter_map(|c| self.record(c)).collect()
        }

        fn find(&self, pred: impl Fn(&ClientRecord) -> bool) -> Option<ClientRecord> {
            self.records().into_iter().find(|r| pred(r))
        }

        fn conflict(&self, new: &NewClient) -> Option<&'static str> {
            if self.users.values().any(|u| u.username == new.user.username || u.email == new.user.email) {
                return Some("user");
            }
            if new.vat.is_some() && self.clients.values().any(|c| c.vat == new.vat) {
                return Some("client");
            }
            let pi = &new.personal_info;
            let taken = |pick: fn(&personal_info::Model) -> &Option<String>, v: &Option<String>| {
                v.is_some() && self.infos.values().any(|p| pick(p) == v)
            };
            if taken(|p| &p.phone, &pi.phone) || taken(|p| &p.email, &pi.email) {
                return Some("personal_info");
            }
            None
        }
    }

    fn compare(sort: Sort, a: &ClientRecord, b: &ClientRecord) -> Ordering {
        let (x, y) = (&a.client, &b.client);
        let ord = match sort.field {
            ClientSortField::Id => x.id.cmp(&y.id),
            ClientSortField::Uuid => x.uuid.cmp(&y.uuid),
            ClientSortField::Vat => x.vat.cmp(&y.vat),
            ClientSortField::CreatedAt => x.created_at.cmp(&y.created_at),
            ClientSortField::UpdatedAt => x.updated_at.cmp(&y.updated_at),
        };
        let ord = match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        ord.then(x.id.cmp(&y.id))
    }

    #[derive(Default)]
    pub struct MockClientRepository {
        tables: Mutex<Tables>,
    }

    impl MockClientRepository {
        pub fn len(&self) -> usize {
            self.tables.lock().unwrap().clients.len()
        }

        pub fn is_empty(&self) -> bool { self.len() == 0 }

        fn sorted(&self, filters: &ClientFilters, sort: Sort) -> Vec<ClientRecord> {
            let tables = self.tables.lock().unwrap();
            let mut rows: Vec<_> = tables.records().into_iter().filter(|r| filters.matches(r)).collect();
            rows.sort_by(|a, b| compare(sort, a, b));
            rows
        }
    }

    #[async_trait]
    impl ClientRepository for MockClientRepository {
        async fn username_exists(&self, username: &str) -> Result<bool, ServiceError> {
            Ok(self.tables.lock().unwrap().users.values().any(|u| u.username == username))
        }

        async fn user_email_exists(&self, email: &str) -> Result<bool, ServiceError> {
            Ok(self.tables.lock().unwrap().users.values().any(|u| u.email == email))
        }

        async fn personal_info_by_phone(&self, phone: &str) -> Result<Option<personal_info::Model>, ServiceError> {
            let tables = self.tables.lock().unwrap();
            Ok(tables.infos.values().find(|p| p.phone.as_deref() == Some(phone)).cloned())
        }

        async fn personal_info_by_email(&self, email: &str) -> Result<Option<personal_info::Model>, ServiceError> {
            let tables = self.tables.lock().unwrap();
            Ok(tables.infos.values().find(|p| p.email.as_deref() == Some(email)).cloned())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<ClientRecord>, ServiceError> {
            let tables = self.tables.lock().unwrap();
            Ok(tables.clients.get(&id).and_then(|c| tables.record(c)))
        }

        async fn find_by_uuid(&self, uuid: &str) -> Result<Option<ClientRecord>, ServiceError> {
            Ok(self.tables.lock().unwrap().find(|r| r.client.uuid == uuid))
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<ClientRecord>, ServiceError> {
            Ok(self.tables.lock().unwrap().find(|r| r.user.username == username))
        }

        async fn find_by_vat(&self, vat: &str) -> Result<Option<ClientRecord>, ServiceError> {
            Ok(self.tables.lock().unwrap().find(|r| r.client.vat.as_deref() == Some(vat)))
        }

        async fn insert(&self, new: NewClient) -> Result<ClientRecord, ServiceError> {
            let mut t = self.tables.lock().unwrap();
            if let Some(which) = t.conflict(&new) {
                return Err(ServiceError::already_exists("Client", format!("duplicate {which} key")));
            }
            let now = Utc::now().into();
            let user_id = t.next_id();
            let user = user::Model {
                id: user_id,
                uuid: Uuid::new_v4().to_string(),
                username: new.user.username,
                email: new.user.email,
                password: new.user.password_hash,
                role: new.user.role,
                is_active: new.user.is_active,
                created_at: now,
                updated_at: now,
            };
            let client_id = t.next_id();
            let client = client::Model { id: client_id, uuid: Uuid::new_v4().to_string(), vat: new.vat, user_id, created_at: now, updated_at: now };
            let info_id = t.next_id();
            let pi = new.personal_info;
            let info = personal_info::Model {
                id: info_id,
                client_id,
                first_name: pi.first_name,
                last_name: pi.last_name,
                email: pi.email,
                phone: pi.phone,
                address: pi.address,
                created_at: now,
                updated_at: now,
            };
            t.users.insert(user_id, user.clone());
            t.clients.insert(client_id, client.clone());
            t.infos.insert(client_id, info.clone());
            Ok(ClientRecord { client, user, personal_info: Some(info) })
        }

        async fn update(&self, existing: ClientRecord, changes: ClientUpdate) -> Result<ClientRecord, ServiceError> {
            let mut t = self.tables.lock().unwrap();
            let now = Utc::now().into();
            let id = existing.client.id;
            let mut client = t.clients.get(&id).cloned().ok_or_else(|| ServiceError::not_found("Client", format!("Client with id: {id} not found")))?;
            if let Some(vat) = changes.vat.clone() { client.vat = Some(vat); }
            client.updated_at = now;
            let mut user = existing.user;
            if let Some(active) = changes.is_active {
                user.is_active = active;
                user.updated_at = now;
            }
            let info = match (t.infos.get(&id).cloned(), changes.touches_personal_info()) {
                (Some(mut p), true) => {
                    if let Some(v) = changes.first_name { p.first_name = v; }
                    if let Some(v) = changes.last_name { p.last_name = v; }
                    if let Some(v) = changes.email { p.email = Some(v); }
                    if let Some(v) = changes.phone { p.phone = Some(v); }
                    if let Some(v) = changes.address { p.address = Some(v); }
                    p.updated_at = now;
                    Some(p)
                }
                (None, true) => {
                    let (Some(first_name), Some(last_name)) = (changes.first_name, changes.last_name) else {
                        return Err(ServiceError::invalid("PersonalInfo", "first and last name required"));
                    };
                    let info_id = t.next_id();
                    Some(personal_info::Model {
                        id: info_id, client_id: id, first_name, last_name,
                        email: changes.email, phone: changes.phone, address: changes.address,
                        created_at: now, updated_at: now,
                    })
                }
                (current, false) => current,
            };
            t.clients.insert(id, client.clone());
            t.users.insert(user.id, user.clone());
            if let Some(p) = info.clone() { t.infos.insert(id, p); }
            Ok(ClientRecord { client, user, personal_info: info })
        }

        async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
            let mut t = self.tables.lock().unwrap();
            t.infos.remove(&id);
            Ok(t.clients.remove(&id).is_some())
        }

        async fn find_page(&self, filters: &ClientFilters, pagination: Pagination, sort: Sort) -> Result<Paginated<ClientRecord>, ServiceError> {
            let rows = self.sorted(filters, sort);
            let total = rows.len() as u64;
            let (_, per_page) = pagination.normalize();
            let page = rows.into_iter().skip(pagination.offset() as usize).take(per_page as usize).collect();
            Ok(Paginated::new(page, total, pagination))
        }

        async fn find_all(&self, filters: &ClientFilters, sort: Sort) -> Result<Vec<ClientRecord>, ServiceError> {
            Ok(self.sorted(filters, sort))
        }

        async fn search_by_name(&self, fragment: &str) -> Result<Vec<ClientRecord>, ServiceError> {
            let all = self.sorted(&ClientFilters::default(), Sort::default());
            Ok(all.into_iter().filter(|r| name_matches(r, fragment)).collect())
        }

        async fn find_by_last_name(&self, fragment: &str) -> Result<Vec<ClientRecord>, ServiceError> {
            let all = self.sorted(&ClientFilters::default(), Sort::default());
            Ok(all.into_iter().filter(|r| last_name_matches(r, fragment)).collect())
        }
    }
}
