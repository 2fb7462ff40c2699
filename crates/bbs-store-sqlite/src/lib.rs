//! SQLite backend for the bulletin board.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod fold;
mod schema;
mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
