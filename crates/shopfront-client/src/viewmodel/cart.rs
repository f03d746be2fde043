//! Shopping cart state for the signed-in user.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use shopfront_shared::{CartItemId, ProductId, UserId};
use shopfront_store::{CartItemWithProduct, Store, StoreError};

use crate::repository::CartRepository;
use crate::viewmodel::project;

pub struct CartViewModel {
    repository: CartRepository,
    current_user_id: watch::Sender<Option<UserId>>,
    cart_items: Arc<watch::Sender<Vec<CartItemWithProduct>>>,
    cart_item_count: Arc<watch::Sender<i64>>,
    cart_total: Arc<watch::Sender<f64>>,
    error_message: watch::Sender<Option<String>>,
    subscriptions: Mutex<Vec<JoinHandle<()>>>,
}

impl CartViewModel {
    pub fn new(store: Store) -> Self {
        Self {
            repository: CartRepository::new(store),
            current_user_id: watch::Sender::new(None),
            cart_items: Arc::new(watch::Sender::new(Vec::new())),
            cart_item_count: Arc::new(watch::Sender::new(0)),
            cart_total: Arc::new(watch::Sender::new(0.0)),
            error_message: watch::Sender::new(None),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn current_user_id(&self) -> watch::Receiver<Option<UserId>> {
        self.current_user_id.subscribe()
    }

    pub fn cart_items(&self) -> watch::Receiver<Vec<CartItemWithProduct>> {
        self.cart_items.subscribe()
    }

    pub fn cart_item_count(&self) -> watch::Receiver<i64> {
        self.cart_item_count.subscribe()
    }

    pub fn cart_total(&self) -> watch::Receiver<f64> {
        self.cart_total.subscribe()
    }

    pub fn error_message(&self) -> watch::Receiver<Option<String>> {
        self.error_message.subscribe()
    }

    /// Point the cart cells at `user_id`, replacing any previous user's
    /// subscriptions.
    pub async fn set_current_user(&self, user_id: UserId) {
        self.current_user_id.send_replace(Some(user_id));

        let views = tokio::try_join!(
            self.repository.cart_with_products(user_id),
            self.repository.cart_item_count(user_id),
            self.repository.cart_total(user_id),
        );

        let (items, count, total) = match views {
            Ok(views) => views,
            Err(e) => {
                tracing::warn!(error = %e, user = %user_id, "failed to open cart views");
                self.error_message
                    .send_replace(Some(format!("Could not load cart: {e}")));
                return;
            }
        };

        let mut subs = self.lock_subscriptions();
        for sub in subs.drain(..) {
            sub.abort();
        }
        subs.push(project(items, self.cart_items.clone()));
        subs.push(project(count, self.cart_item_count.clone()));
        subs.push(project(total, self.cart_total.clone()));
    }

    /// Add a product to the current user's cart.
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: i64) {
        let Some(user_id) = *self.current_user_id.borrow() else {
            return;
        };
        self.run(
            "Could not add to cart",
            self.repository.add_to_cart(user_id, product_id, quantity).await,
        );
    }

    /// Set a line's quantity; zero or less removes it.
    pub async fn update_quantity(&self, cart_item_id: CartItemId, new_quantity: i64) {
        self.run(
            "Could not update quantity",
            self.repository.update_quantity(cart_item_id, new_quantity).await,
        );
    }

    /// Bump a line's quantity by one.
    pub async fn increment_quantity(&self, cart_item_id: CartItemId) {
        if let Some(line) = self.find_line(cart_item_id) {
            self.update_quantity(cart_item_id, line.item.quantity + 1).await;
        }
    }

    /// Lower a line's quantity by one; at one, the line is removed.
    pub async fn decrement_quantity(&self, cart_item_id: CartItemId) {
        if let Some(line) = self.find_line(cart_item_id) {
            if line.item.quantity > 1 {
                self.update_quantity(cart_item_id, line.item.quantity - 1).await;
            } else {
                self.remove_from_cart(cart_item_id).await;
            }
        }
    }

    pub async fn remove_from_cart(&self, cart_item_id: CartItemId) {
        self.run(
            "Could not remove item",
            self.repository.remove_from_cart(cart_item_id).await.map(|_| ()),
        );
    }

    /// Remove the current user's line for `product_id`.
    pub async fn remove_by_product(&self, product_id: ProductId) {
        let Some(user_id) = *self.current_user_id.borrow() else {
            return;
        };
        self.run(
            "Could not remove item",
            self.repository
                .remove_by_ids(user_id, product_id)
                .await
                .map(|_| ()),
        );
    }

    /// Empty the current user's cart.
    pub async fn clear_cart(&self) {
        let Some(user_id) = *self.current_user_id.borrow() else {
            return;
        };
        self.run(
            "Could not clear cart",
            self.repository.clear_cart(user_id).await,
        );
    }

    pub fn clear_error(&self) {
        self.error_message.send_replace(None);
    }

    fn find_line(&self, cart_item_id: CartItemId) -> Option<CartItemWithProduct> {
        self.cart_items
            .borrow()
            .iter()
            .find(|line| line.item.id == cart_item_id)
            .cloned()
    }

    fn run(&self, context: &str, result: Result<(), StoreError>) {
        match result {
            Ok(()) => {
                self.error_message.send_replace(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "{context}");
                self.error_message
                    .send_replace(Some(format!("{context}: {e}")));
            }
        }
    }

    fn lock_subscriptions(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CartViewModel {
    fn drop(&mut self) {
        for sub in self.lock_subscriptions().drain(..) {
            sub.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use shopfront_store::{Product, User};
    use tokio::time::timeout;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    async fn test_vm() -> (tempfile::TempDir, Store, CartViewModel, UserId, ProductId) {
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

        let vm = CartViewModel::new(store.clone());
        vm.set_current_user(user).await;
        (dir, store, vm, user, product)
    }

    async fn wait_for_count(vm: &CartViewModel, expected: i64) {
        let mut count = vm.cart_item_count();
        timeout(WAIT, async {
            while *count.borrow_and_update() != expected {
                count.changed().await.unwrap();
            }
        })
        .await
        .unwrap_or_else(|_| panic!("count never reached {expected}"));
    }

    /// The three cells are fed by independent tasks, so each assertion has to
    /// wait on its own cell.
    async fn wait_for_items<F>(vm: &CartViewModel, pred: F) -> Vec<CartItemWithProduct>
    where
        F: Fn(&[CartItemWithProduct]) -> bool,
    {
        let mut items = vm.cart_items();
        timeout(WAIT, async {
            while !pred(&items.borrow_and_update()) {
                items.changed().await.unwrap();
            }
        })
        .await
        .expect("cart items never matched");
        let result = items.borrow().clone();
        result
    }

    async fn wait_for_total(vm: &CartViewModel, expected: f64) {
        let mut total = vm.cart_total();
        timeout(WAIT, async {
            while (*total.borrow_and_update() - expected).abs() > 1e-9 {
                total.changed().await.unwrap();
            }
        })
        .await
        .unwrap_or_else(|_| panic!("total never reached {expected}"));
    }

    #[tokio::test]
    async fn adds_accumulate_and_totals_follow() {
        let (_dir, _store, vm, _user, product) = test_vm().await;

        vm.add_to_cart(product, 2).await;
        vm.add_to_cart(product, 2).await;
        wait_for_count(&vm, 4).await;

        let items = wait_for_items(&vm, |items| {
            items.len() == 1 && items[0].item.quantity == 4
        })
        .await;
        assert_eq!(items[0].product.name, "Mug");
        wait_for_total(&vm, 119.96).await;
    }

    #[tokio::test]
    async fn decrement_at_one_removes_the_line() {
        let (_dir, _store, vm, _user, product) = test_vm().await;

        vm.add_to_cart(product, 1).await;
        let items = wait_for_items(&vm, |items| items.len() == 1).await;

        vm.decrement_quantity(items[0].item.id).await;
        wait_for_items(&vm, |items| items.is_empty()).await;
        wait_for_count(&vm, 0).await;
    }

    #[tokio::test]
    async fn increment_bumps_by_one() {
        let (_dir, _store, vm, _user, product) = test_vm().await;

        vm.add_to_cart(product, 2).await;
        let items = wait_for_items(&vm, |items| items.len() == 1).await;

        vm.increment_quantity(items[0].item.id).await;
        wait_for_count(&vm, 3).await;
    }

    #[tokio::test]
    async fn clear_cart_empties_the_cells() {
        let (_dir, _store, vm, _user, product) = test_vm().await;

        vm.add_to_cart(product, 5).await;
        wait_for_count(&vm, 5).await;

        vm.clear_cart().await;
        wait_for_count(&vm, 0).await;
        wait_for_total(&vm, 0.0).await;
    }

    #[tokio::test]
    async fn switching_user_swaps_the_projections() {
        let (_dir, store, vm, _user, product) = test_vm().await;

        vm.add_to_cart(product, 3).await;
        wait_for_count(&vm, 3).await;

        let ben = store
            .with(|db| db.insert_user(&User::new("Ben", "ben@example.com", "digest".into())))
            .await
            .unwrap();

        vm.set_current_user(ben).await;
        wait_for_count(&vm, 0).await;
        wait_for_items(&vm, |items| items.is_empty()).await;
        wait_for_total(&vm, 0.0).await;
    }
}
