//! Per-screen observable state containers.
//!
//! Each view-model owns `tokio::sync::watch` cells the UI observes.  Cells
//! change only in response to an explicit user action or to a fresh emission
//! from a subscribed live store view; every failure is folded into an error
//! string at this boundary.

mod auth;
mod cart;
mod location;
mod products;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use shopfront_store::LiveQuery;

pub use auth::{AuthState, AuthViewModel};
pub use cart::CartViewModel;
pub use location::{LocationState, LocationViewModel};
pub use products::ProductViewModel;

/// Forward every emission of a live view into a watch cell, starting with the
/// current snapshot.  The task keeps the view alive; aborting it ends the
/// subscription.
pub(crate) fn project<T: Clone + Send + Sync + 'static>(
    live: LiveQuery<T>,
    cell: Arc<watch::Sender<T>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = live.receiver();
        let _live = live;
        loop {
            let value = rx.borrow_and_update().clone();
            cell.send_replace(value);
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
