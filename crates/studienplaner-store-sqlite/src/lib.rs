//! SQLite backend for the Studienplaner course store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. That single connection thread also
//! serialises every call, and multi-statement operations run inside
//! transactions.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
