use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use models::{client, personal_info, role::Role, user};

use super::domain::{ClientInsert, ClientReadOnly, ClientRecord, ClientUpdate, NewClient};
use super::filters::ClientFilters;
use super::repository::ClientRepository;
use crate::errors::ServiceError;
use crate::pagination::{Paginated, Pagination, Sort};
use crate::password::PasswordEncoder;
use crate::security::SecurityContext;

fn invalid(entity: &'static str) -> impl Fn(models::errors::ModelError) -> ServiceError {
    move |e| ServiceError::from_model(entity, e)
}

fn validate_insert(input: &ClientInsert) -> Result<(), ServiceError> {
    user::validate_username(&input.user.username).map_err(invalid("User"))?;
    user::validate_email(&input.user.email).map_err(invalid("User"))?;
    user::validate_password(&input.user.password).map_err(invalid("User"))?;
    if let Some(vat) = input.vat.as_deref() {
        client::validate_vat(vat).map_err(invalid("Client"))?;
    }
    let pi = &input.personal_info;
    personal_info::validate_name(&pi.first_name).map_err(invalid("PersonalInfo"))?;
    personal_info::validate_name(&pi.last_name).map_err(invalid("PersonalInfo"))?;
    if let Some(phone) = pi.phone.as_deref() {
        personal_info::validate_phone(phone).map_err(invalid("PersonalInfo"))?;
    }
    if let Some(email) = pi.email.as_deref() {
        user::validate_email(email).map_err(invalid("PersonalInfo"))?;
    }
    Ok(())
}

fn validate_update(changes: &ClientUpdate) -> Result<(), ServiceError> {
    if let Some(vat) = changes.vat.as_deref() {
        client::validate_vat(vat).map_err(invalid("Client"))?;
    }
    for name in [&changes.first_name, &changes.last_name].into_iter().flatten() {
        personal_info::validate_name(name).map_err(invalid("PersonalInfo"))?;
    }
    if let Some(phone) = changes.phone.as_deref() {
        personal_info::validate_phone(phone).map_err(invalid("PersonalInfo"))?;
    }
    if let Some(email) = changes.email.as_deref() {
        user::validate_email(email).map_err(invalid("PersonalInfo"))?;
    }
    Ok(())
}

fn required(entity: &'static str, label: &str, value: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::invalid(entity, format!("{label} must not be blank")));
    }
    Ok(value.to_string())
}

/// Client management business service, independent of the web framework.
pub struct ClientService<R: ClientRepository + ?Sized> {
    repo: Arc<R>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl<R: ClientRepository + ?Sized> ClientService<R> {
    pub fn new(repo: Arc<R>, encoder: Arc<dyn PasswordEncoder>) -> Self { Self { repo, encoder } }

    /// Register a client together with its user account and personal info.
    ///
    /// Creating a `SUPER_ADMIN` account requires a caller that already holds `SUPER_ADMIN`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::client::{ClientService, repository::mock::MockClientRepository};
    /// use service::client::domain::{ClientInsert, PersonalInfoInsert, UserInsert};
    /// use service::password::Argon2PasswordEncoder;
    /// use service::security::SecurityContext;
    /// let svc = ClientService::new(Arc::new(MockClientRepository::default()), Arc::new(Argon2PasswordEncoder));
    /// let input = ClientInsert {
    ///     vat: Some("EL123456".into()),
    ///     user: UserInsert { username: "jdoe".into(), email: "jdoe@example.com".into(), password: "Secret123".into(), role: Default::default(), is_active: true },
    ///     personal_info: PersonalInfoInsert { first_name: "John".into(), last_name: "Doe".into(), ..Default::default() },
    /// };
    /// let created = tokio_test::block_on(svc.create_client(&SecurityContext::anonymous(), input)).unwrap();
    /// assert_eq!(created.user.username, "jdoe");
    /// ```
    #[instrument(skip(self, ctx, input), fields(username = %input.user.username, role = %input.user.role))]
    pub async fn create_client(&self, ctx: &SecurityContext, input: ClientInsert) -> Result<ClientReadOnly, ServiceError> {
        let input = input.normalized();
        validate_insert(&input)?;

        if self.repo.username_exists(&input.user.username).await? {
            return Err(ServiceError::already_exists("User", format!("User with username: {} already exists", input.user.username)));
        }
        if self.repo.user_email_exists(&input.user.email).await? {
            return Err(ServiceError::already_exists("User", format!("User with email: {} already exists", input.user.email)));
        }
        if let Some(vat) = input.vat.as_deref() {
            if self.repo.find_by_vat(vat).await?.is_some() {
                return Err(ServiceError::already_exists("Client", format!("Client with VAT: {vat} already exists")));
            }
        }
        let pi = &input.personal_info;
        if let Some(phone) = pi.phone.as_deref() {
            if self.repo.personal_info_by_phone(phone).await?.is_some() {
                return Err(ServiceError::already_exists("PersonalInfo", format!("Personal info with phone: {phone} already exists")));
            }
        }
        if let Some(email) = pi.email.as_deref() {
            if self.repo.personal_info_by_email(email).await?.is_some() {
                return Err(ServiceError::already_exists("PersonalInfo", format!("Personal info with email: {email} already exists")));
            }
        }

        if input.user.role == Role::SuperAdmin {
            if !ctx.is_authenticated() {
                warn!("anonymous attempt to create SUPER_ADMIN");
                return Err(ServiceError::not_authorized("User", "Authentication required to create SUPER_ADMIN users"));
            }
            if !ctx.has_authority(Role::SuperAdmin.as_str()) {
                warn!(caller = ?ctx.principal().map(|p| &p.username), "SUPER_ADMIN creation denied");
                return Err(ServiceError::not_authorized("User", "Only SUPER_ADMIN can create SUPER_ADMIN users"));
            }
        }

        let password_hash = self.encoder.encode(&input.user.password)?;
        let new = NewClient {
            user: user::NewUser {
                username: input.user.username,
                email: input.user.email,
                password_hash,
                role: input.user.role,
                is_active: input.user.is_active,
            },
            vat: input.vat,
            personal_info: personal_info::NewPersonalInfo {
                first_name: input.personal_info.first_name,
                last_name: input.personal_info.last_name,
                email: input.personal_info.email,
                phone: input.personal_info.phone,
                address: input.personal_info.address,
            },
        };
        let record = self.repo.insert(new).await?;
        info!(client_id = record.client.id, uuid = %record.client.uuid, algorithm = self.encoder.algorithm(), "client_created");
        Ok(record.into())
    }

    /// Apply a partial update. VAT, phone and email must stay unique across other clients.
    #[instrument(skip(self, changes))]
    pub async fn update_client(&self, id: i64, changes: ClientUpdate) -> Result<ClientReadOnly, ServiceError> {
        let changes = changes.normalized();
        validate_update(&changes)?;
        let existing = self.load(id).await?;

        if let Some(vat) = changes.vat.as_deref() {
            if existing.client.vat.as_deref() != Some(vat) {
                if let Some(other) = self.repo.find_by_vat(vat).await? {
                    if other.client.id != id {
                        return Err(ServiceError::already_exists("Client", format!("Client with VAT: {vat} already exists")));
                    }
                }
            }
        }
        if let Some(phone) = changes.phone.as_deref() {
            if let Some(other) = self.repo.personal_info_by_phone(phone).await? {
                if other.client_id != id {
                    return Err(ServiceError::already_exists("PersonalInfo", format!("Personal info with phone: {phone} already exists")));
                }
            }
        }
        if let Some(email) = changes.email.as_deref() {
            if let Some(other) = self.repo.personal_info_by_email(email).await? {
                if other.client_id != id {
                    return Err(ServiceError::already_exists("PersonalInfo", format!("Personal info with email: {email} already exists")));
                }
            }
        }

        let record = self.repo.update(existing, changes).await?;
        info!(client_id = id, "client_updated");
        Ok(record.into())
    }

    #[instrument(skip(self))]
    pub async fn get_client_by_id(&self, id: i64) -> Result<ClientReadOnly, ServiceError> {
        Ok(self.load(id).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn get_client_by_uuid(&self, uuid: &str) -> Result<ClientReadOnly, ServiceError> {
        self.repo
            .find_by_uuid(uuid)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::not_found("Client", format!("Client with uuid: {uuid} not found")))
    }

    #[instrument(skip(self))]
    pub async fn get_client_by_username(&self, username: &str) -> Result<ClientReadOnly, ServiceError> {
        self.repo
            .find_by_username(username)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::not_found("Client", format!("Client with username: {username} not found")))
    }

    /// Remove a client; its personal info goes with it.
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: i64) -> Result<ClientReadOnly, ServiceError> {
        let existing = self.load(id).await?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("Client", format!("Client with id: {id} not found")));
        }
        info!(client_id = id, uuid = %existing.client.uuid, "client_deleted");
        Ok(existing.into())
    }

    /// Page of clients ordered by ascending id.
    pub async fn get_paginated_clients(&self, page: u32, size: u32) -> Result<Paginated<ClientReadOnly>, ServiceError> {
        self.get_clients_filtered_paginated(&ClientFilters::default(), Pagination::new(page, size), Sort::default()).await
    }

    pub async fn get_paginated_sorted_clients(
        &self,
        page: u32,
        size: u32,
        sort_by: &str,
        sort_direction: &str,
    ) -> Result<Paginated<ClientReadOnly>, ServiceError> {
        let sort = Sort::parse(sort_by, sort_direction)?;
        self.get_clients_filtered_paginated(&ClientFilters::default(), Pagination::new(page, size), sort).await
    }

    #[instrument(skip(self, filters), fields(page = pagination.page, size = pagination.per_page))]
    pub async fn get_clients_filtered_paginated(
        &self,
        filters: &ClientFilters,
        pagination: Pagination,
        sort: Sort,
    ) -> Result<Paginated<ClientReadOnly>, ServiceError> {
        let pagination = pagination.validate()?;
        let filters = filters.normalized();
        debug!(?filters, ?sort, "listing clients");
        let page = self.repo.find_page(&filters, pagination, sort).await?;
        Ok(page.map(ClientReadOnly::from))
    }

    #[instrument(skip(self, filters))]
    pub async fn get_clients_filtered(&self, filters: &ClientFilters) -> Result<Vec<ClientReadOnly>, ServiceError> {
        let rows = self.repo.find_all(&filters.normalized(), Sort::default()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive match on first name, last name or "first last".
    #[instrument(skip(self))]
    pub async fn search_clients_by_name(&self, name: &str) -> Result<Vec<ClientReadOnly>, ServiceError> {
        let name = required("Client", "name", name)?;
        let rows = self.repo.search_by_name(&name).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_clients_by_last_name(&self, last_name: &str) -> Result<Vec<ClientReadOnly>, ServiceError> {
        let last_name = required("Client", "last name", last_name)?;
        let rows = self.repo.find_by_last_name(&last_name).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn load(&self, id: i64) -> Result<ClientRecord, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", format!("Client with id: {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::domain::{PersonalInfoInsert, UserInsert};
    use crate::client::repository::mock::MockClientRepository;
    use crate::password::testing::PlainPasswordEncoder;

    fn svc() -> (Arc<MockClientRepository>, ClientService<MockClientRepository>) {
        let repo = Arc::new(MockClientRepository::default());
        let svc = ClientService::new(repo.clone(), Arc::new(PlainPasswordEncoder));
        (repo, svc)
    }

    fn insert(tag: &str) -> ClientInsert {
        ClientInsert {
            vat: Some(format!("VAT{tag}")),
            user: UserInsert {
                username: format!("user_{tag}"),
                email: format!("user_{tag}@example.com"),
                password: "Secret123".into(),
                role: Role::Client,
                is_active: true,
            },
            personal_info: PersonalInfoInsert {
                first_name: format!("First{tag}"),
                last_name: format!("Last{tag}"),
                email: Some(format!("pi_{tag}@example.com")),
                phone: Some(format!("69000000{tag:0>2}")),
                address: None,
            },
        }
    }

    fn anon() -> SecurityContext { SecurityContext::anonymous() }

    #[tokio::test]
    async fn create_encodes_password_and_returns_view() {
        let (repo, svc) = svc();
        let created = svc.create_client(&anon(), insert("1")).await.unwrap();
        assert_eq!(created.vat.as_deref(), Some("VAT1"));
        assert_eq!(created.user.role, Role::Client);
        assert_eq!(created.personal_info.as_ref().unwrap().last_name, "Last1");
        assert!(!created.uuid.is_empty());
        let stored = repo.find_by_username("user_1").await.unwrap().unwrap();
        assert_eq!(stored.user.password, "plain:Secret123");
    }

    #[tokio::test]
    async fn create_rejects_each_duplicate_key() {
        let (repo, svc) = svc();
        svc.create_client(&anon(), insert("1")).await.unwrap();

        let mut dup_user = insert("2");
        dup_user.user.username = "user_1".into();
        let err = svc.create_client(&anon(), dup_user).await.unwrap_err();
        assert_eq!(err.code(), "UserAlreadyExists");
        assert_eq!(err.to_string(), "User with username: user_1 already exists");

        let mut dup_email = insert("2");
        dup_email.user.email = "user_1@example.com".into();
        assert_eq!(svc.create_client(&anon(), dup_email).await.unwrap_err().code(), "UserAlreadyExists");

        let mut dup_vat = insert("2");
        dup_vat.vat = Some("VAT1".into());
        let err = svc.create_client(&anon(), dup_vat).await.unwrap_err();
        assert_eq!(err.code(), "ClientAlreadyExists");
        assert_eq!(err.to_string(), "Client with VAT: VAT1 already exists");

        let mut dup_phone = insert("2");
        dup_phone.personal_info.phone = Some("6900000001".into());
        assert_eq!(svc.create_client(&anon(), dup_phone).await.unwrap_err().code(), "PersonalInfoAlreadyExists");

        let mut dup_pi_email = insert("2");
        dup_pi_email.personal_info.email = Some("pi_1@example.com".into());
        assert_eq!(svc.create_client(&anon(), dup_pi_email).await.unwrap_err().code(), "PersonalInfoAlreadyExists");

        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn create_without_vat_or_phone_skips_those_checks() {
        let (repo, svc) = svc();
        for tag in ["1", "2"] {
            let mut input = insert(tag);
            input.vat = Some("   ".into());
            input.personal_info.phone = None;
            svc.create_client(&anon(), input).await.unwrap();
        }
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn create_validates_fields() {
        let (_, svc) = svc();
        let mut bad_pwd = insert("1");
        bad_pwd.user.password = "short".into();
        assert_eq!(svc.create_client(&anon(), bad_pwd).await.unwrap_err().code(), "UserInvalidArgument");

        let mut bad_phone = insert("1");
        bad_phone.personal_info.phone = Some("abc".into());
        assert_eq!(svc.create_client(&anon(), bad_phone).await.unwrap_err().code(), "PersonalInfoInvalidArgument");

        let mut bad_vat = insert("1");
        bad_vat.vat = Some("EL-12".into());
        assert_eq!(svc.create_client(&anon(), bad_vat).await.unwrap_err().code(), "ClientInvalidArgument");
    }

    #[tokio::test]
    async fn super_admin_creation_is_gated() {
        let (repo, svc) = svc();
        let mut input = insert("1");
        input.user.role = Role::SuperAdmin;

        let err = svc.create_client(&anon(), input.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotAuthorized { entity: "User", .. }));
        assert_eq!(err.to_string(), "Authentication required to create SUPER_ADMIN users");

        let admin = SecurityContext::for_role("admin", Role::Admin);
        let err = svc.create_client(&admin, input.clone()).await.unwrap_err();
        assert_eq!(err.to_string(), "Only SUPER_ADMIN can create SUPER_ADMIN users");
        assert!(repo.is_empty());

        let root = SecurityContext::for_role("root", Role::SuperAdmin);
        let created = svc.create_client(&root, input).await.unwrap();
        assert_eq!(created.user.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn update_vat_conflicts_only_with_other_clients() {
        let (_, svc) = svc();
        let a = svc.create_client(&anon(), insert("1")).await.unwrap();
        svc.create_client(&anon(), insert("2")).await.unwrap();

        let steal = ClientUpdate { vat: Some("VAT2".into()), ..Default::default() };
        let err = svc.update_client(a.id, steal).await.unwrap_err();
        assert_eq!(err.code(), "ClientAlreadyExists");

        let same = ClientUpdate { vat: Some("VAT1".into()), address: Some("Thessaloniki".into()), ..Default::default() };
        let updated = svc.update_client(a.id, same).await.unwrap();
        assert_eq!(updated.vat.as_deref(), Some("VAT1"));
        assert_eq!(updated.personal_info.unwrap().address.as_deref(), Some("Thessaloniki"));

        let own_phone = ClientUpdate { phone: Some("6900000001".into()), ..Default::default() };
        assert!(svc.update_client(a.id, own_phone).await.is_ok());
        let other_phone = ClientUpdate { phone: Some("6900000002".into()), ..Default::default() };
        assert_eq!(svc.update_client(a.id, other_phone).await.unwrap_err().code(), "PersonalInfoAlreadyExists");
    }

    #[tokio::test]
    async fn update_is_partial_and_can_deactivate() {
        let (_, svc) = svc();
        let a = svc.create_client(&anon(), insert("1")).await.unwrap();
        let changes = ClientUpdate { first_name: Some("Anna".into()), is_active: Some(false), ..Default::default() };
        let updated = svc.update_client(a.id, changes).await.unwrap();
        let pi = updated.personal_info.unwrap();
        assert_eq!(pi.first_name, "Anna");
        assert_eq!(pi.last_name, "Last1");
        assert!(!updated.user.is_active);
        assert_eq!(updated.vat, a.vat);
        assert!(updated.updated_at >= a.updated_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let (_, svc) = svc();
        let err = svc.get_client_by_id(42).await.unwrap_err();
        assert_eq!(err.code(), "ClientNotFound");
        assert_eq!(err.to_string(), "Client with id: 42 not found");
        assert!(matches!(svc.delete_client(42).await, Err(ServiceError::NotFound { .. })));
        assert!(matches!(svc.update_client(42, ClientUpdate::default()).await, Err(ServiceError::NotFound { .. })));
        assert!(svc.get_client_by_uuid("nope").await.is_err());
        assert!(svc.get_client_by_username("nobody").await.is_err());
    }

    #[tokio::test]
    async fn lookups_and_delete() {
        let (repo, svc) = svc();
        let a = svc.create_client(&anon(), insert("1")).await.unwrap();
        assert_eq!(svc.get_client_by_uuid(&a.uuid).await.unwrap().id, a.id);
        assert_eq!(svc.get_client_by_username("user_1").await.unwrap().id, a.id);

        let deleted = svc.delete_client(a.id).await.unwrap();
        assert_eq!(deleted.id, a.id);
        assert!(repo.is_empty());
        assert!(svc.get_client_by_id(a.id).await.is_err());
    }

    #[tokio::test]
    async fn pagination_defaults_to_ascending_id() {
        let (_, svc) = svc();
        for i in 1..=5 {
            svc.create_client(&anon(), insert(&i.to_string())).await.unwrap();
        }
        let page = svc.get_paginated_clients(0, 2).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.data[0].id < page.data[1].id);

        let last = svc.get_paginated_clients(2, 2).await.unwrap();
        assert_eq!(last.number_of_elements, 1);
        assert_eq!(last.data[0].user.username, "user_5");
    }

    #[tokio::test]
    async fn sorted_pages_follow_requested_order() {
        let (_, svc) = svc();
        for i in 1..=3 {
            svc.create_client(&anon(), insert(&i.to_string())).await.unwrap();
        }
        let page = svc.get_paginated_sorted_clients(0, 10, "vat", "desc").await.unwrap();
        let vats: Vec<_> = page.data.iter().map(|c| c.vat.clone().unwrap()).collect();
        assert_eq!(vats, ["VAT3", "VAT2", "VAT1"]);

        let err = svc.get_paginated_sorted_clients(0, 10, "password", "asc").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument { .. }));
        assert!(svc.get_paginated_sorted_clients(0, 10, "id", "up").await.is_err());
        let err = svc.get_paginated_clients(0, 500).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument { .. }));
        assert!(svc.get_paginated_clients(0, 0).await.is_err());
        assert_eq!(svc.get_paginated_clients(0, 100).await.unwrap().page_size, 100);
    }

    #[tokio::test]
    async fn filters_and_name_search() {
        let (_, svc) = svc();
        for i in 1..=4 {
            svc.create_client(&anon(), insert(&i.to_string())).await.unwrap();
        }
        let target = svc.get_client_by_username("user_3").await.unwrap();
        svc.update_client(target.id, ClientUpdate { is_active: Some(false), ..Default::default() }).await.unwrap();

        let inactive = ClientFilters { active: Some(false), ..Default::default() };
        let rows = svc.get_clients_filtered(&inactive).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, target.id);

        let by_vat = ClientFilters { vat: Some("VAT4".into()), ..Default::default() };
        let page = svc.get_clients_filtered_paginated(&by_vat, Pagination::default(), Sort::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.data[0].user.username, "user_4");

        assert_eq!(svc.get_clients_filtered(&ClientFilters::default()).await.unwrap().len(), 4);

        let hits = svc.search_clients_by_name("first1 LAST1").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(svc.search_clients_by_name("first").await.unwrap().len(), 4);
        assert_eq!(svc.get_clients_by_last_name("last4").await.unwrap().len(), 1);
        assert_eq!(svc.search_clients_by_name("  ").await.unwrap_err().code(), "ClientInvalidArgument");
        assert!(svc.get_clients_by_last_name("").await.is_err());
    }

    #[tokio::test]
    async fn equality_filters_on_username_email_and_phone() {
        let (_, svc) = svc();
        for i in 1..=3 {
            svc.create_client(&anon(), insert(&i.to_string())).await.unwrap();
        }

        let by_username = ClientFilters { username: Some("user_2".into()), ..Default::default() };
        let rows = svc.get_clients_filtered(&by_username).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user.username, "user_2");
        let partial = ClientFilters { username: Some("user_".into()), ..Default::default() };
        assert!(svc.get_clients_filtered(&partial).await.unwrap().is_empty());

        let by_email = ClientFilters { email: Some("pi_3@example.com".into()), ..Default::default() };
        let page = svc.get_clients_filtered_paginated(&by_email, Pagination::default(), Sort::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.data[0].user.username, "user_3");
        let account_email = ClientFilters { email: Some("user_3@example.com".into()), ..Default::default() };
        assert!(svc.get_clients_filtered(&account_email).await.unwrap().is_empty());

        let by_phone = ClientFilters { phone: Some("6900000001".into()), ..Default::default() };
        let rows = svc.get_clients_filtered(&by_phone).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user.username, "user_1");
        let wrong_phone = ClientFilters { phone: Some("6999999999".into()), ..Default::default() };
        assert!(svc.get_clients_filtered(&wrong_phone).await.unwrap().is_empty());

        let mismatched = ClientFilters { phone: Some("6900000001".into()), username: Some("user_2".into()), ..Default::default() };
        assert!(svc.get_clients_filtered(&mismatched).await.unwrap().is_empty());
    }
}
