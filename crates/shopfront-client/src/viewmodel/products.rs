//! Catalog browsing state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use shopfront_shared::ProductId;
use shopfront_store::{LiveQuery, Product, Store, StoreError};

use crate::repository::ProductRepository;
use crate::viewmodel::project;

pub struct ProductViewModel {
    repository: ProductRepository,
    products: Arc<watch::Sender<Vec<Product>>>,
    search_query: watch::Sender<String>,
    error_message: watch::Sender<Option<String>>,
    products_feed: JoinHandle<()>,
}

impl ProductViewModel {
    /// Build the view-model and subscribe to the available-products view.
    pub async fn new(store: Store) -> Result<Self, StoreError> {
        let repository = ProductRepository::new(store);
        let products = Arc::new(watch::Sender::new(Vec::new()));

        let live = repository.available_products().await?;
        let products_feed = project(live, products.clone());

        Ok(Self {
            repository,
            products,
            search_query: watch::Sender::new(String::new()),
            error_message: watch::Sender::new(None),
            products_feed,
        })
    }

    /// Available products, kept current by the store.
    pub fn products(&self) -> watch::Receiver<Vec<Product>> {
        self.products.subscribe()
    }

    pub fn search_query(&self) -> watch::Receiver<String> {
        self.search_query.subscribe()
    }

    pub fn error_message(&self) -> watch::Receiver<Option<String>> {
        self.error_message.subscribe()
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.search_query.send_replace(query.into());
    }

    /// A fresh live view over products matching `query`; the caller owns the
    /// subscription.
    pub async fn search(&self, query: impl Into<String>) -> Option<LiveQuery<Vec<Product>>> {
        match self.repository.search(query.into()).await {
            Ok(live) => Some(live),
            Err(e) => {
                tracing::warn!(error = %e, "product search failed");
                self.error_message
                    .send_replace(Some(format!("Could not search products: {e}")));
                None
            }
        }
    }

    pub async fn get_product(&self, id: ProductId) -> Option<Product> {
        match self.repository.get_product(id).await {
            Ok(product) => product,
            Err(e) => {
                tracing::warn!(error = %e, "product lookup failed");
                self.error_message
                    .send_replace(Some(format!("Could not load product: {e}")));
                None
            }
        }
    }

    pub async fn insert_product(&self, product: Product) {
        self.run("Could not save product", self.repository.insert_product(product).await.map(|_| ()));
    }

    pub async fn update_product(&self, product: Product) {
        self.run("Could not update product", self.repository.update_product(product).await);
    }

    pub async fn delete_product(&self, id: ProductId) {
        self.run("Could not delete product", self.repository.delete_product(id).await.map(|_| ()));
    }

    pub async fn set_stock(&self, id: ProductId, stock: i64) {
        self.run("Could not update stock", self.repository.set_stock(id, stock).await);
    }

    pub fn clear_error(&self) {
        self.error_message.send_replace(None);
    }

    /// Fold an action result into the error cell.
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
}

impl Drop for ProductViewModel {
    fn drop(&mut self) {
        self.products_feed.abort();
    }
}
