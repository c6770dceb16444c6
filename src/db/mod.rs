//! Database module
//!
//! SQLite connection pool and schema migrations for the material catalog.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
