use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use models::role::Role;
use service::client::domain::{ClientInsert, ClientReadOnly, ClientUpdate};
use service::client::filters::ClientFilters;
use service::pagination::{Paginated, Pagination, Sort};

use crate::errors::ApiError;
use crate::routes::auth::{AuthContext, ServerState};

const MANAGERS: &[Role] = &[Role::Admin, Role::SuperAdmin];

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// 0-based page index
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination::new(self.page.unwrap_or(d.page), self.size.unwrap_or(d.per_page))
    }

    fn sort(&self) -> Result<Sort, ApiError> {
        let field = self.sort_by.as_deref().unwrap_or("id");
        let direction = self.sort_direction.as_deref().unwrap_or("asc");
        Ok(Sort::parse(field, direction)?)
    }
}

/// Filter and paging parameters in one flat query string.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub uuid: Option<String>,
    pub vat: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

impl SearchQuery {
    fn split(self) -> (ClientFilters, PageQuery) {
        let filters = ClientFilters {
            uuid: self.uuid,
            vat: self.vat,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            active: self.active,
        };
        let page = PageQuery { page: self.page, size: self.size, sort_by: self.sort_by, sort_direction: self.sort_direction };
        (filters, page)
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LastNameQuery {
    #[serde(default)]
    pub last_name: String,
}

#[utoipa::path(
    post, path = "/api/clients", tag = "clients",
    request_body = crate::openapi::ClientInsertDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ClientReadOnlyDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 403, description = "Not Authorized", body = crate::openapi::ErrorBodyDoc),
        (status = 409, description = "Already Exists", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    AuthContext(ctx): AuthContext,
    Json(input): Json<ClientInsert>,
) -> Result<(StatusCode, Json<ClientReadOnly>), ApiError> {
    // privileged accounts are only handed out by managers
    if input.user.role != Role::Client {
        ctx.require_any_role(MANAGERS)?;
    }
    let created = state.clients.create_client(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/clients", tag = "clients",
    params(PageQuery),
    responses((status = 200, description = "Page of clients"), (status = 400, description = "Bad sort parameters"))
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<PageQuery>) -> Result<Json<Paginated<ClientReadOnly>>, ApiError> {
    let p = q.pagination();
    let page = match (q.sort_by.as_deref(), q.sort_direction.as_deref()) {
        (None, None) => state.clients.get_paginated_clients(p.page, p.per_page).await?,
        (field, dir) => {
            state.clients
                .get_paginated_sorted_clients(p.page, p.per_page, field.unwrap_or("id"), dir.unwrap_or("asc"))
                .await?
        }
    };
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/clients/search", tag = "clients",
    params(SearchQuery),
    responses((status = 200, description = "Filtered page of clients"))
)]
pub async fn search(State(state): State<ServerState>, Query(q): Query<SearchQuery>) -> Result<Json<Paginated<ClientReadOnly>>, ApiError> {
    let (filters, page) = q.split();
    let sort = page.sort()?;
    let result = state.clients.get_clients_filtered_paginated(&filters, page.pagination(), sort).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get, path = "/api/clients/all", tag = "clients",
    params(SearchQuery),
    responses((status = 200, description = "All matching clients"))
)]
pub async fn all(State(state): State<ServerState>, Query(q): Query<SearchQuery>) -> Result<Json<Vec<ClientReadOnly>>, ApiError> {
    let (filters, _) = q.split();
    Ok(Json(state.clients.get_clients_filtered(&filters).await?))
}

#[utoipa::path(get, path = "/api/clients/by-name", tag = "clients", params(NameQuery), responses((status = 200, description = "Matches"), (status = 400, description = "Blank name")))]
pub async fn by_name(State(state): State<ServerState>, Query(q): Query<NameQuery>) -> Result<Json<Vec<ClientReadOnly>>, ApiError> {
    Ok(Json(state.clients.search_clients_by_name(&q.name).await?))
}

#[utoipa::path(get, path = "/api/clients/by-last-name", tag = "clients", params(LastNameQuery), responses((status = 200, description = "Matches"), (status = 400, description = "Blank last name")))]
pub async fn by_last_name(State(state): State<ServerState>, Query(q): Query<LastNameQuery>) -> Result<Json<Vec<ClientReadOnly>>, ApiError> {
    Ok(Json(state.clients.get_clients_by_last_name(&q.last_name).await?))
}

#[utoipa::path(get, path = "/api/clients/{id}", tag = "clients", params(("id" = i64, Path, description = "Client id")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<ClientReadOnly>, ApiError> {
    Ok(Json(state.clients.get_client_by_id(id).await?))
}

#[utoipa::path(get, path = "/api/clients/uuid/{uuid}", tag = "clients", params(("uuid" = String, Path, description = "Client uuid")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get_by_uuid(State(state): State<ServerState>, Path(uuid): Path<String>) -> Result<Json<ClientReadOnly>, ApiError> {
    Ok(Json(state.clients.get_client_by_uuid(&uuid).await?))
}

#[utoipa::path(get, path = "/api/clients/username/{username}", tag = "clients", params(("username" = String, Path, description = "Account username")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get_by_username(State(state): State<ServerState>, Path(username): Path<String>) -> Result<Json<ClientReadOnly>, ApiError> {
    Ok(Json(state.clients.get_client_by_username(&username).await?))
}

#[utoipa::path(
    put, path = "/api/clients/{id}", tag = "clients",
    params(("id" = i64, Path, description = "Client id")),
    request_body = crate::openapi::ClientUpdateDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Not Authorized"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Already Exists")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    AuthContext(ctx): AuthContext,
    Path(id): Path<i64>,
    Json(changes): Json<ClientUpdate>,
) -> Result<Json<ClientReadOnly>, ApiError> {
    let caller = ctx.require_any_role(MANAGERS)?;
    info!(client_id = id, caller = %caller.username, "client_update_request");
    Ok(Json(state.clients.update_client(id, changes).await?))
}

#[utoipa::path(
    delete, path = "/api/clients/{id}", tag = "clients",
    params(("id" = i64, Path, description = "Client id")),
    responses((status = 200, description = "Deleted"), (status = 403, description = "Not Authorized"), (status = 404, description = "Not Found"))
)]
pub async fn delete(
    State(state): State<ServerState>,
    AuthContext(ctx): AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<ClientReadOnly>, ApiError> {
    let caller = ctx.require_any_role(MANAGERS)?;
    info!(client_id = id, caller = %caller.username, "client_delete_request");
    Ok(Json(state.clients.delete_client(id).await?))
}
