//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.  A SQLite update hook maps
//! every row mutation to a [`TableChange`] broadcast, which is what drives the
//! live query views in [`crate::live`]; cascade deletes fire the hook for each
//! affected row, so cart views track user and product deletions without any
//! application-side bookkeeping.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::hooks::Action;
use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::catalog;
use crate::error::{Result, StoreError};
use crate::live::TableChange;
use crate::migrations;

/// Broadcast capacity for table-change notifications.  Laggy subscribers
/// coalesce missed notifications into a single recompute, so this only needs
/// to absorb short bursts.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
    changes: broadcast::Sender<TableChange>,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/shopfront/shopfront.db`
    /// - macOS:   `~/Library/Application Support/com.shopfront.shopfront/shopfront.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\shopfront\shopfront\data\shopfront.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "shopfront", "shopfront").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("shopfront.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Recommended SQLite settings.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // A version of 0 means the schema has never been created; remember it
        // so we can seed the catalog exactly once, below.
        let fresh: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        // Run schema migrations.
        migrations::run_migrations(&conn)?;

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let hook_tx = changes.clone();
        conn.update_hook(Some(
            move |_action: Action, _db: &str, table: &str, _rowid: i64| {
                if let Some(change) = TableChange::from_table(table) {
                    let _ = hook_tx.send(change);
                }
            },
        ));

        let db = Self { conn, changes };

        if fresh == 0 {
            db.insert_products(&catalog::default_catalog())?;
            tracing::info!("seeded initial product catalog");
        }

        Ok(db)
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers, but direct access is
    /// occasionally needed for transactions or ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return a mutable reference to the underlying connection.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    /// Subscribe to table-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }

    /// Publish a change the update hook cannot observe (unqualified DELETEs
    /// may run via the truncate optimization, which skips the hook).
    pub(crate) fn notify(&self, change: TableChange) {
        let _ = self.changes.send(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let db = Database::open_at(&path).expect("should open");
        assert!(db.path().is_some());
    }

    #[test]
    fn seeds_catalog_only_on_first_creation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let db = Database::open_at(&path).unwrap();
            let products = db.list_products().unwrap();
            assert_eq!(products.len(), catalog::default_catalog().len());
            db.delete_all_products().unwrap();
        }

        // Reopening an existing database must not re-seed.
        let db = Database::open_at(&path).unwrap();
        assert!(db.list_products().unwrap().is_empty());
    }
}
