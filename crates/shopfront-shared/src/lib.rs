//! # shopfront-shared
//!
//! Types shared by every Shopfront crate: the typed row identifiers, the
//! password digest used by the auth flow, and the device-location contracts
//! consumed by the presentation layer.

pub mod auth;
pub mod location;
pub mod types;

pub use location::{LocationError, LocationFix, LocationProvider, PermissionGate};
pub use types::{CartItemId, ProductId, UserId};
