//! Types and helpers shared by the server and the binary.

pub mod types;
pub mod utils;
