//! OpenAPI document. Request/response shapes are mirrored here as schema-only
//! structs so the service crate stays free of doc derives.

use chrono::{DateTime, FixedOffset};
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    /// e.g. `ClientNotFound`, `UserAlreadyExists`
    pub code: String,
    pub description: String,
}

#[derive(ToSchema)]
pub struct UserInsertDoc {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `SUPER_ADMIN`, `ADMIN` or `CLIENT` (default)
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
pub struct PersonalInfoInsertDoc {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(ToSchema)]
pub struct ClientInsertDoc {
    pub vat: Option<String>,
    pub user: UserInsertDoc,
    pub personal_info: PersonalInfoInsertDoc,
}

#[derive(ToSchema)]
pub struct ClientUpdateDoc {
    pub vat: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
pub struct UserReadOnlyDoc {
    pub id: i64,
    pub uuid: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(ToSchema)]
pub struct ClientReadOnlyDoc {
    pub id: i64,
    pub uuid: String,
    pub vat: Option<String>,
    pub user: UserReadOnlyDoc,
    pub personal_info: Option<PersonalInfoInsertDoc>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::clients::create,
        crate::routes::clients::list,
        crate::routes::clients::search,
        crate::routes::clients::all,
        crate::routes::clients::by_name,
        crate::routes::clients::by_last_name,
        crate::routes::clients::get_by_id,
        crate::routes::clients::get_by_uuid,
        crate::routes::clients::get_by_username,
        crate::routes::clients::update,
        crate::routes::clients::delete,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            ErrorBodyDoc,
            UserInsertDoc,
            PersonalInfoInsertDoc,
            ClientInsertDoc,
            ClientUpdateDoc,
            UserReadOnlyDoc,
            ClientReadOnlyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "clients")
    )
)]
pub struct ApiDoc;
