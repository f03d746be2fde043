//! Thin forwarding layer between the view-models and the store.
//!
//! Each repository wraps the shared [`Store`](shopfront_store::Store) handle;
//! apart from `add_to_cart`, `update_quantity` and `register`, every method
//! forwards 1:1 to the access layer.

mod cart;
mod products;
mod users;

pub use cart::CartRepository;
pub use products::ProductRepository;
pub use users::{RegisterOutcome, UserRepository};
