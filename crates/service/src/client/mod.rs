//! Client management: domain DTOs, filter composition, repository
//! abstraction (SeaORM and in-memory) and the business service.

pub mod domain;
pub mod filters;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::ClientService;
