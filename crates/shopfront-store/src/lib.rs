//! # shopfront-store
//!
//! Local storage for the Shopfront application, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! model, plus the async-facing pieces the presentation layer builds on: the
//! shared [`Store`] handle (all access dispatched to the blocking pool) and
//! [`LiveQuery`] views that re-push query snapshots whenever a source table
//! changes.

pub mod cart;
pub mod catalog;
pub mod database;
pub mod handle;
pub mod live;
pub mod migrations;
pub mod models;
pub mod products;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use handle::Store;
pub use live::{LiveQuery, TableChange};
pub use models::*;
