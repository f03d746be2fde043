//! Continuous query views.
//!
//! A [`LiveQuery`] keeps the result of a snapshot query up to date: whenever
//! one of its source tables changes, the query re-runs on the blocking pool
//! and the fresh snapshot is pushed to watch subscribers.  The driving task
//! is aborted when the handle drops, which ends the subscription together
//! with the screen that owned it.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::database::Database;
use crate::error::Result;
use crate::handle::Store;

/// The table a mutation touched; the granularity live views subscribe at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableChange {
    Products,
    Users,
    CartItems,
}

impl TableChange {
    pub(crate) fn from_table(name: &str) -> Option<Self> {
        match name {
            "products" => Some(Self::Products),
            "users" => Some(Self::Users),
            "cart_items" => Some(Self::CartItems),
            _ => None,
        }
    }
}

/// A continuously maintained query result.
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T: Clone + Send + Sync + 'static> LiveQuery<T> {
    /// Compute the initial snapshot and start tracking `tables`.
    pub async fn spawn<F>(store: Store, tables: &'static [TableChange], query: F) -> Result<Self>
    where
        F: Fn(&Database) -> Result<T> + Send + Sync + 'static,
    {
        let query = Arc::new(query);

        let initial = {
            let query = query.clone();
            store.with(move |db| (*query)(db)).await?
        };

        let (tx, rx) = watch::channel(initial);
        let mut changes = store.subscribe_changes()?;

        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) if tables.contains(&change) => {}
                    Ok(_) => continue,
                    // Missed notifications coalesce into one recompute.
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }

                let query = query.clone();
                match store.with(move |db| (*query)(db)).await {
                    Ok(value) => {
                        tx.send_replace(value);
                    }
                    Err(e) => tracing::warn!(error = %e, "live query refresh failed"),
                }
            }
        });

        Ok(Self { rx, task })
    }

    /// The latest snapshot.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// A watch half for callers that want to select on updates themselves.
    pub fn receiver(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }

    /// Wait until the snapshot changes.
    pub async fn changed(&mut self) {
        let _ = self.rx.changed().await;
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
