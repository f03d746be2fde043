//! Domain model structs persisted in the local SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer over IPC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_shared::{CartItemId, ProductId, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Row id; [`UserId::UNSET`] until the store assigns one.
    pub id: UserId,
    pub name: String,
    /// Unique across the table; registration rejects duplicates.
    pub email: String,
    /// Hex SHA-256 digest of the password (see `shopfront_shared::auth`).
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A fresh, active account ready for insertion.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: UserId::UNSET,
            name: name.into(),
            email: email.into(),
            password_hash,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Row id; [`ProductId::UNSET`] until the store assigns one.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Non-negative unit price.
    pub price: f64,
    pub category: String,
    pub stock: i64,
    /// URL or local resource name of the product image.
    pub image_url: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CartItem
// ---------------------------------------------------------------------------

/// One line of a user's cart. At most one row exists per (user, product)
/// pair; repeated adds accumulate into `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Row id; [`CartItemId::UNSET`] until the store assigns one.
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(user_id: UserId, product_id: ProductId, quantity: i64) -> Self {
        Self {
            id: CartItemId::UNSET,
            user_id,
            product_id,
            quantity,
            added_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// CartItemWithProduct
// ---------------------------------------------------------------------------

/// A cart line joined with its product, computed per query for display and
/// subtotal math. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItemWithProduct {
    pub item: CartItem,
    pub product: Product,
}

impl CartItemWithProduct {
    pub fn line_total(&self) -> f64 {
        self.product.price * self.item.quantity as f64
    }
}
