//! SeaORM entities for users, clients and their personal information,
//! plus the field validators shared by the service layer.

pub mod errors;
pub mod db;
pub mod role;
pub mod user;
pub mod client;
pub mod personal_info;

#[cfg(test)]
mod tests;
