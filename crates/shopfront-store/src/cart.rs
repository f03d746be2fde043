//! CRUD operations for [`CartItem`] records and the joined cart views.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use shopfront_shared::{CartItemId, ProductId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::live::TableChange;
use crate::models::{CartItem, CartItemWithProduct, Product};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a cart line, or overwrite the existing line for the same
    /// (user, product) pair.  Returns the row id.
    pub fn insert_cart_item(&self, item: &CartItem) -> Result<CartItemId> {
        let id: i64 = self.conn().query_row(
            "INSERT INTO cart_items (id, user_id, product_id, quantity, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, product_id) DO UPDATE SET
                 quantity = excluded.quantity,
                 added_at = excluded.added_at
             RETURNING id",
            params![
                (!item.id.is_unset()).then_some(item.id.0),
                item.user_id.0,
                item.product_id.0,
                item.quantity,
                item.added_at.to_rfc3339(),
            ],
            |row| row.get(0),
        )?;
        Ok(CartItemId(id))
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// A user's cart joined with product details, most recently added first.
    pub fn list_cart_with_products(&self, user_id: UserId) -> Result<Vec<CartItemWithProduct>> {
        let mut stmt = self.conn().prepare(
            "SELECT c.id, c.user_id, c.product_id, c.quantity, c.added_at,
                    p.id, p.name, p.description, p.price, p.category, p.stock,
                    p.image_url, p.is_available, p.created_at
             FROM cart_items c
             INNER JOIN products p ON p.id = c.product_id
             WHERE c.user_id = ?1
             ORDER BY c.added_at DESC, c.id DESC",
        )?;

        let rows = stmt.query_map(params![user_id.0], row_to_cart_item_with_product)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// A user's bare cart lines, most recently added first.
    pub fn list_cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, product_id, quantity, added_at
             FROM cart_items
             WHERE user_id = ?1
             ORDER BY added_at DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![user_id.0], row_to_cart_item)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// The cart line for a (user, product) pair, if present.
    pub fn get_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, user_id, product_id, quantity, added_at
                 FROM cart_items
                 WHERE user_id = ?1 AND product_id = ?2
                 LIMIT 1",
                params![user_id.0, product_id.0],
                row_to_cart_item,
            )
            .optional()?)
    }

    /// Total number of items in a user's cart (sum of quantities).
    pub fn cart_item_count(&self, user_id: UserId) -> Result<i64> {
        Ok(self.conn().query_row(
            "SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE user_id = ?1",
            params![user_id.0],
            |row| row.get(0),
        )?)
    }

    /// Cart total: sum of price * quantity over the user's lines.
    pub fn cart_total(&self, user_id: UserId) -> Result<f64> {
        Ok(self.conn().query_row(
            "SELECT COALESCE(SUM(p.price * c.quantity), 0.0)
             FROM cart_items c
             INNER JOIN products p ON p.id = c.product_id
             WHERE c.user_id = ?1",
            params![user_id.0],
            |row| row.get(0),
        )?)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update every field of an existing cart line.
    pub fn update_cart_item(&self, item: &CartItem) -> Result<()> {
        self.conn().execute(
            "UPDATE cart_items
             SET user_id = ?2, product_id = ?3, quantity = ?4, added_at = ?5
             WHERE id = ?1",
            params![
                item.id.0,
                item.user_id.0,
                item.product_id.0,
                item.quantity,
                item.added_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Add `delta` to a line's quantity.
    pub fn increment_quantity(&self, id: CartItemId, delta: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE cart_items SET quantity = quantity + ?2 WHERE id = ?1",
            params![id.0, delta],
        )?;
        Ok(())
    }

    /// Set a line's quantity directly.
    pub fn set_quantity(&self, id: CartItemId, quantity: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE cart_items SET quantity = ?2 WHERE id = ?1",
            params![id.0, quantity],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a cart line by id.  Returns `true` if a row was deleted.
    pub fn delete_cart_item(&self, id: CartItemId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM cart_items WHERE id = ?1", params![id.0])?;
        Ok(affected > 0)
    }

    /// Delete the line for a (user, product) pair.  Returns `true` if a row
    /// was deleted.
    pub fn delete_cart_item_by_ids(&self, user_id: UserId, product_id: ProductId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
            params![user_id.0, product_id.0],
        )?;
        Ok(affected > 0)
    }

    /// Remove every line of a user's cart.
    pub fn clear_cart(&self, user_id: UserId) -> Result<()> {
        self.conn().execute(
            "DELETE FROM cart_items WHERE user_id = ?1",
            params![user_id.0],
        )?;
        Ok(())
    }

    /// Remove every cart line for every user.
    pub fn delete_all_cart_items(&self) -> Result<()> {
        self.conn().execute("DELETE FROM cart_items", [])?;
        self.notify(TableChange::CartItems);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`CartItem`].
fn row_to_cart_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<CartItem> {
    let added_str: String = row.get(4)?;
    let added_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&added_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(CartItem {
        id: CartItemId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        product_id: ProductId(row.get(2)?),
        quantity: row.get(3)?,
        added_at,
    })
}

/// Map a joined `rusqlite::Row` (cart columns 0-4, product columns 5-13) to a
/// [`CartItemWithProduct`].
fn row_to_cart_item_with_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<CartItemWithProduct> {
    let added_str: String = row.get(4)?;
    let added_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&added_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
    let created_str: String = row.get(13)?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(13, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(CartItemWithProduct {
        item: CartItem {
            id: CartItemId(row.get(0)?),
            user_id: UserId(row.get(1)?),
            product_id: ProductId(row.get(2)?),
            quantity: row.get(3)?,
            added_at,
        },
        product: Product {
            id: ProductId(row.get(5)?),
            name: row.get(6)?,
            description: row.get(7)?,
            price: row.get(8)?,
            category: row.get(9)?,
            stock: row.get(10)?,
            image_url: row.get(11)?,
            is_available: row.get(12)?,
            created_at,
        },
    })
}
