//! SQLite backend for the social graph store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Friendship writes touch the
//! `friend_edges` pair and both `friend_count` columns inside one transaction,
//! so readers never observe a half-applied edge.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
