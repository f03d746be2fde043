//! Shared store handle and the process-wide singleton.
//!
//! [`Store`] is the async-facing entry point: a cloneable handle around the
//! single open [`Database`].  Every access goes through [`Store::with`],
//! which runs the closure on tokio's shared blocking pool, so SQLite work
//! never blocks an async task or a UI thread.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, OnceCell};
use tokio::task;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::live::TableChange;

static STORE: OnceCell<Store> = OnceCell::const_new();

/// Cloneable handle to the single open [`Database`].
#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
}

impl Store {
    /// Wrap an already-open database.
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (or create) the default application database.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Database::new()?))
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    /// The process-wide store, opened lazily on first call.
    ///
    /// Concurrent first calls race on the open but exactly one handle is
    /// ever published; later calls return it without touching the lock.
    pub async fn global() -> Result<&'static Store> {
        STORE
            .get_or_try_init(|| async { task::spawn_blocking(Store::open_default).await? })
            .await
    }

    /// Run `f` against the database on the blocking pool.
    pub async fn with<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        task::spawn_blocking(move || {
            let guard = db.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }

    /// Subscribe to table-change notifications.
    pub fn subscribe_changes(&self) -> Result<broadcast::Receiver<TableChange>> {
        let guard = self.db.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_runs_on_the_blocking_pool() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(&dir.path().join("test.db")).unwrap();

        let count = store
            .with(|db| Ok(db.list_products()?.len()))
            .await
            .unwrap();
        assert_eq!(count, crate::catalog::default_catalog().len());
    }
}
