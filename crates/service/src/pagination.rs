//! Pagination utilities for service layer
//!
//! Provides `Pagination` (offset/limit inputs), `Sort` (whitelisted client
//! columns plus direction) and `Paginated`, the page envelope returned to callers.

use std::str::FromStr;

use serde::Serialize;

use models::client;
use crate::errors::ServiceError;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 0-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Reject page sizes outside `1..=MAX_PAGE_SIZE` instead of silently shrinking them.
    pub fn validate(self) -> Result<Self, ServiceError> {
        if (1..=MAX_PAGE_SIZE).contains(&self.per_page) {
            Ok(self)
        } else {
            Err(ServiceError::invalid(
                "Client",
                format!("page size must be between 1 and {MAX_PAGE_SIZE}, got {}", self.per_page),
            ))
        }
    }

    /// Clamp to sane bounds and convert to `u64` (page index, page size)
    pub fn normalize(self) -> (u64, u64) {
        let per_page = self.per_page.clamp(1, MAX_PAGE_SIZE);
        (self.page as u64, per_page as u64)
    }

    /// Row offset of the first element on this page.
    pub fn offset(self) -> u64 {
        let (page, per_page) = self.normalize();
        page * per_page
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 0, per_page: 20 } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ServiceError::invalid("Client", format!("invalid sort direction: {other}"))),
        }
    }
}

/// Client columns a caller may sort by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClientSortField {
    #[default]
    Id,
    Uuid,
    Vat,
    CreatedAt,
    UpdatedAt,
}

impl ClientSortField {
    pub fn column(self) -> client::Column {
        match self {
            ClientSortField::Id => client::Column::Id,
            ClientSortField::Uuid => client::Column::Uuid,
            ClientSortField::Vat => client::Column::Vat,
            ClientSortField::CreatedAt => client::Column::CreatedAt,
            ClientSortField::UpdatedAt => client::Column::UpdatedAt,
        }
    }
}

impl FromStr for ClientSortField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(ClientSortField::Id),
            "uuid" => Ok(ClientSortField::Uuid),
            "vat" => Ok(ClientSortField::Vat),
            "createdAt" | "created_at" => Ok(ClientSortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(ClientSortField::UpdatedAt),
            other => Err(ServiceError::invalid("Client", format!("cannot sort by: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: ClientSortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: ClientSortField, direction: SortDirection) -> Self { Self { field, direction } }

    /// Parse caller-supplied field and direction, e.g. (`"vat"`, `"DESC"`).
    pub fn parse(field: &str, direction: &str) -> Result<Self, ServiceError> {
        Ok(Self { field: field.parse()?, direction: direction.parse()? })
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Clone, Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number_of_elements: u64,
    pub current_page: u64,
    pub page_size: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total_elements: u64, pagination: Pagination) -> Self {
        let (current_page, page_size) = pagination.normalize();
        Self {
            number_of_elements: data.len() as u64,
            total_pages: total_elements.div_ceil(page_size),
            data,
            total_elements,
            current_page,
            page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number_of_elements: self.number_of_elements,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }
}
