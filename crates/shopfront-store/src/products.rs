//! CRUD operations for [`Product`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use shopfront_shared::ProductId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::live::TableChange;
use crate::models::Product;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a product, or update it in place when the id already exists.
    /// Returns the row id.
    pub fn insert_product(&self, product: &Product) -> Result<ProductId> {
        let id: i64 = self.conn().query_row(
            "INSERT INTO products (id, name, description, price, category, stock,
                                   image_url, is_available, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                 name         = excluded.name,
                 description  = excluded.description,
                 price        = excluded.price,
                 category     = excluded.category,
                 stock        = excluded.stock,
                 image_url    = excluded.image_url,
                 is_available = excluded.is_available,
                 created_at   = excluded.created_at
             RETURNING id",
            params![
                (!product.id.is_unset()).then_some(product.id.0),
                product.name,
                product.description,
                product.price,
                product.category,
                product.stock,
                product.image_url,
                product.is_available,
                product.created_at.to_rfc3339(),
            ],
            |row| row.get(0),
        )?;
        Ok(ProductId(id))
    }

    /// Insert several products.
    pub fn insert_products(&self, products: &[Product]) -> Result<()> {
        for product in products {
            self.insert_product(product)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List all products, ordered by name.
    pub fn list_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, description, price, category, stock, image_url,
                    is_available, created_at
             FROM products
             ORDER BY name ASC",
        )?;

        let rows = stmt.query_map([], row_to_product)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// List products currently flagged available.
    pub fn list_available_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, description, price, category, stock, image_url,
                    is_available, created_at
             FROM products
             WHERE is_available = 1
             ORDER BY name ASC",
        )?;

        let rows = stmt.query_map([], row_to_product)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Fetch a single product by id.
    pub fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, name, description, price, category, stock, image_url,
                        is_available, created_at
                 FROM products
                 WHERE id = ?1",
                params![id.0],
                row_to_product,
            )
            .optional()?)
    }

    /// Case-insensitive substring search on the product name.
    pub fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, description, price, category, stock, image_url,
                    is_available, created_at
             FROM products
             WHERE name LIKE '%' || ?1 || '%'
             ORDER BY name ASC",
        )?;

        let rows = stmt.query_map(params![query], row_to_product)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// List products in a category.
    pub fn list_products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, description, price, category, stock, image_url,
                    is_available, created_at
             FROM products
             WHERE category = ?1
             ORDER BY name ASC",
        )?;

        let rows = stmt.query_map(params![category], row_to_product)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update every field of an existing product.
    pub fn update_product(&self, product: &Product) -> Result<()> {
        self.conn().execute(
            "UPDATE products
             SET name = ?2, description = ?3, price = ?4, category = ?5,
                 stock = ?6, image_url = ?7, is_available = ?8, created_at = ?9
             WHERE id = ?1",
            params![
                product.id.0,
                product.name,
                product.description,
                product.price,
                product.category,
                product.stock,
                product.image_url,
                product.is_available,
                product.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Set the stock count without touching the rest of the record.
    pub fn set_stock(&self, id: ProductId, stock: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE products SET stock = ?2 WHERE id = ?1",
            params![id.0, stock],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    // ON DELETE CASCADE: the product's cart rows go with it
    /// Delete a product by id.  Returns `true` if a row was deleted.
    pub fn delete_product(&self, id: ProductId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM products WHERE id = ?1", params![id.0])?;
        Ok(affected > 0)
    }

    /// Delete every product (and, via cascade, every cart row).
    pub fn delete_all_products(&self) -> Result<()> {
        self.conn().execute("DELETE FROM products", [])?;
        self.notify(TableChange::Products);
        self.notify(TableChange::CartItems);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Product`].
pub(crate) fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    let created_str: String = row.get(8)?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Product {
        id: ProductId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        stock: row.get(5)?,
        image_url: row.get(6)?,
        is_available: row.get(7)?,
        created_at,
    })
}
