//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Password login against stored user credentials and HS256 bearer tokens
//! that resolve back into a [`crate::security::SecurityContext`].

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
