//! # shopfront-client
//!
//! The application layer over the local store: repositories (thin forwarding
//! plus the cart and registration behaviors) and the per-screen view-models a
//! UI observes.  Rendering, navigation and platform bindings live outside
//! this crate.

pub mod repository;
pub mod viewmodel;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shopfront_client=debug,shopfront_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::info!("Shopfront client initialised");
}
