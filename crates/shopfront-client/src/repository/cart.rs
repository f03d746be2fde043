//! Cart operations: forwarding plus the add/adjust behaviors.

use shopfront_shared::{CartItemId, ProductId, UserId};
use shopfront_store::{
    CartItem, CartItemWithProduct, LiveQuery, Store, StoreError, TableChange,
};

#[derive(Clone)]
pub struct CartRepository {
    store: Store,
}

impl CartRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------
    // Live views
    // ------------------------------------------------------------------

    /// Live view of a user's cart joined with product details.
    pub async fn cart_with_products(
        &self,
        user_id: UserId,
    ) -> Result<LiveQuery<Vec<CartItemWithProduct>>, StoreError> {
        LiveQuery::spawn(
            self.store.clone(),
            &[TableChange::CartItems, TableChange::Products],
            move |db| db.list_cart_with_products(user_id),
        )
        .await
    }

    /// Live view of a user's bare cart lines.
    pub async fn cart_items(
        &self,
        user_id: UserId,
    ) -> Result<LiveQuery<Vec<CartItem>>, StoreError> {
        LiveQuery::spawn(self.store.clone(), &[TableChange::CartItems], move |db| {
            db.list_cart_items(user_id)
        })
        .await
    }

    /// Live item count (sum of quantities).
    pub async fn cart_item_count(&self, user_id: UserId) -> Result<LiveQuery<i64>, StoreError> {
        LiveQuery::spawn(self.store.clone(), &[TableChange::CartItems], move |db| {
            db.cart_item_count(user_id)
        })
        .await
    }

    /// Live cart total.  Tracks product changes too, so a price update
    /// re-pushes the total.
    pub async fn cart_total(&self, user_id: UserId) -> Result<LiveQuery<f64>, StoreError> {
        LiveQuery::spawn(
            self.store.clone(),
            &[TableChange::CartItems, TableChange::Products],
            move |db| db.cart_total(user_id),
        )
        .await
    }

    // ------------------------------------------------------------------
    // One-shot operations
    // ------------------------------------------------------------------

    pub async fn get_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>, StoreError> {
        self.store
            .with(move |db| db.get_cart_item(user_id, product_id))
            .await
    }

    /// Add a product to a cart, accumulating quantity if a line already
    /// exists.  The lookup and the write run in one closure under the store
    /// lock, so repeated calls can never race into duplicate rows.
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        self.store
            .with(move |db| match db.get_cart_item(user_id, product_id)? {
                Some(existing) => db.increment_quantity(existing.id, quantity),
                None => db
                    .insert_cart_item(&CartItem::new(user_id, product_id, quantity))
                    .map(|_| ()),
            })
            .await
    }

    /// Set a line's quantity; anything at or below zero removes the line.
    /// Deletion is keyed by id alone.
    pub async fn update_quantity(
        &self,
        cart_item_id: CartItemId,
        new_quantity: i64,
    ) -> Result<(), StoreError> {
        self.store
            .with(move |db| {
                if new_quantity <= 0 {
                    db.delete_cart_item(cart_item_id).map(|_| ())
                } else {
                    db.set_quantity(cart_item_id, new_quantity)
                }
            })
            .await
    }

    pub async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<bool, StoreError> {
        self.store
            .with(move |db| db.delete_cart_item(cart_item_id))
            .await
    }

    pub async fn remove_by_ids(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, StoreError> {
        self.store
            .with(move |db| db.delete_cart_item_by_ids(user_id, product_id))
            .await
    }

    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), StoreError> {
        self.store.with(move |db| db.clear_cart(user_id)).await
    }

    pub async fn insert_cart_item(&self, item: CartItem) -> Result<CartItemId, StoreError> {
        self.store.with(move |db| db.insert_cart_item(&item)).await
    }

    pub async fn update_cart_item(&self, item: CartItem) -> Result<(), StoreError> {
        self.store.with(move |db| db.update_cart_item(&item)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use shopfront_store::{Product, User};

    use super::*;

    async fn test_repo() -> (tempfile::TempDir, CartRepository, UserId, ProductId) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(&dir.path().join("test.db")).unwrap();

        let (user, product) = store
            .with(|db| {
                db.delete_all_products()?;
                let user = db.insert_user(&User::new("Ana", "ana@example.com", "digest".into()))?;
                let product = db.insert_product(&Product {
                    id: ProductId::UNSET,
                    name: "Mug".to_string(),
                    description: String::new(),
                    price: 29.99,
                    category: "General".to_string(),
                    stock: 10,
                    image_url: String::new(),
                    is_available: true,
                    created_at: Utc::now(),
                })?;
                Ok((user, product))
            })
            .await
            .unwrap();

        (dir, CartRepository::new(store), user, product)
    }

    #[tokio::test]
    async fn repeated_adds_accumulate_into_one_line() {
        let (_dir, repo, user, product) = test_repo().await;

        repo.add_to_cart(user, product, 2).await.unwrap();
        repo.add_to_cart(user, product, 2).await.unwrap();
        repo.add_to_cart(user, product, 3).await.unwrap();

        let item = repo
            .get_cart_item(user, product)
            .await
            .unwrap()
            .expect("one line should exist");
        assert_eq!(item.quantity, 7);

        let count = repo.cart_item_count(user).await.unwrap();
        assert_eq!(count.current(), 7);
    }

    #[tokio::test]
    async fn worked_example_twice_two_mugs() {
        let (_dir, repo, user, product) = test_repo().await;

        repo.add_to_cart(user, product, 2).await.unwrap();
        repo.add_to_cart(user, product, 2).await.unwrap();

        let item = repo.get_cart_item(user, product).await.unwrap().unwrap();
        assert_eq!(item.quantity, 4);

        let total = repo.cart_total(user).await.unwrap();
        assert!((total.current() - 119.96).abs() < 1e-9);
    }

    #[tokio::test]
    async fn nonpositive_quantity_removes_the_line() {
        let (_dir, repo, user, product) = test_repo().await;

        repo.add_to_cart(user, product, 3).await.unwrap();
        let id = repo.get_cart_item(user, product).await.unwrap().unwrap().id;

        repo.update_quantity(id, 0).await.unwrap();
        assert!(repo.get_cart_item(user, product).await.unwrap().is_none());

        repo.add_to_cart(user, product, 3).await.unwrap();
        let id = repo.get_cart_item(user, product).await.unwrap().unwrap().id;

        repo.update_quantity(id, -5).await.unwrap();
        assert!(repo.get_cart_item(user, product).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn positive_quantity_is_set_directly() {
        let (_dir, repo, user, product) = test_repo().await;

        repo.add_to_cart(user, product, 1).await.unwrap();
        let id = repo.get_cart_item(user, product).await.unwrap().unwrap().id;

        repo.update_quantity(id, 12).await.unwrap();
        let item = repo.get_cart_item(user, product).await.unwrap().unwrap();
        assert_eq!(item.quantity, 12);
    }
}
