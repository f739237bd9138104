use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use models::{client, personal_info, user, role::Role};

fn default_active() -> bool { true }

/// Trim and drop blank optional strings.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Account part of a client registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInsert {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfoInsert {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Registration input: the user, the client's business identifier and contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInsert {
    #[serde(default)]
    pub vat: Option<String>,
    pub user: UserInsert,
    pub personal_info: PersonalInfoInsert,
}

impl ClientInsert {
    pub(crate) fn normalized(mut self) -> Self {
        self.vat = clean(self.vat);
        self.user.username = self.user.username.trim().to_string();
        self.user.email = self.user.email.trim().to_string();
        let pi = &mut self.personal_info;
        pi.first_name = pi.first_name.trim().to_string();
        pi.last_name = pi.last_name.trim().to_string();
        pi.email = clean(pi.email.take());
        pi.phone = clean(pi.phone.take());
        pi.address = clean(pi.address.take());
        self
    }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientUpdate {
    pub vat: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl ClientUpdate {
    pub(crate) fn normalized(self) -> Self {
        Self {
            vat: clean(self.vat),
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            email: clean(self.email),
            phone: clean(self.phone),
            address: clean(self.address),
            is_active: self.is_active,
        }
    }

    pub fn touches_personal_info(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.address.is_some()
    }
}

/// Everything the repository needs to persist a client as one unit.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub user: user::NewUser,
    pub vat: Option<String>,
    pub personal_info: personal_info::NewPersonalInfo,
}

/// A client row joined with its user and personal info.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub client: client::Model,
    pub user: user::Model,
    pub personal_info: Option<personal_info::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReadOnly {
    pub id: i64,
    pub uuid: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfoReadOnly {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Read-only view of a client handed to the API layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientReadOnly {
    pub id: i64,
    pub uuid: String,
    pub vat: Option<String>,
    pub user: UserReadOnly,
    pub personal_info: Option<PersonalInfoReadOnly>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserReadOnly {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, uuid: u.uuid, username: u.username, email: u.email, role: u.role, is_active: u.is_active }
    }
}

impl From<personal_info::Model> for PersonalInfoReadOnly {
    fn from(p: personal_info::Model) -> Self {
        Self { first_name: p.first_name, last_name: p.last_name, email: p.email, phone: p.phone, address: p.address }
    }
}

impl From<ClientRecord> for ClientReadOnly {
    fn from(r: ClientRecord) -> Self {
        Self {
            id: r.client.id,
            uuid: r.client.uuid,
            vat: r.client.vat,
            user: r.user.into(),
            personal_info: r.personal_info.map(Into::into),
            created_at: r.client.created_at,
            updated_at: r.client.updated_at,
        }
    }
}
