//! Product operations, forwarded to the store.

use shopfront_shared::ProductId;
use shopfront_store::{LiveQuery, Product, Store, StoreError, TableChange};

#[derive(Clone)]
pub struct ProductRepository {
    store: Store,
}

impl ProductRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Live view over the whole catalog.
    pub async fn all_products(&self) -> Result<LiveQuery<Vec<Product>>, StoreError> {
        LiveQuery::spawn(self.store.clone(), &[TableChange::Products], |db| {
            db.list_products()
        })
        .await
    }

    /// Live view over available products only.
    pub async fn available_products(&self) -> Result<LiveQuery<Vec<Product>>, StoreError> {
        LiveQuery::spawn(self.store.clone(), &[TableChange::Products], |db| {
            db.list_available_products()
        })
        .await
    }

    /// Live view over products whose name contains `query`.
    pub async fn search(&self, query: String) -> Result<LiveQuery<Vec<Product>>, StoreError> {
        LiveQuery::spawn(self.store.clone(), &[TableChange::Products], move |db| {
            db.search_products(&query)
        })
        .await
    }

    /// Live view over one category.
    pub async fn by_category(&self, category: String) -> Result<LiveQuery<Vec<Product>>, StoreError> {
        LiveQuery::spawn(self.store.clone(), &[TableChange::Products], move |db| {
            db.list_products_by_category(&category)
        })
        .await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.store.with(move |db| db.get_product(id)).await
    }

    pub async fn insert_product(&self, product: Product) -> Result<ProductId, StoreError> {
        self.store.with(move |db| db.insert_product(&product)).await
    }

    pub async fn insert_products(&self, products: Vec<Product>) -> Result<(), StoreError> {
        self.store
            .with(move |db| db.insert_products(&products))
            .await
    }

    pub async fn update_product(&self, product: Product) -> Result<(), StoreError> {
        self.store.with(move |db| db.update_product(&product)).await
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        self.store.with(move |db| db.delete_product(id)).await
    }

    pub async fn delete_all_products(&self) -> Result<(), StoreError> {
        self.store.with(|db| db.delete_all_products()).await
    }

    pub async fn set_stock(&self, id: ProductId, stock: i64) -> Result<(), StoreError> {
        self.store.with(move |db| db.set_stock(id, stock)).await
    }
}
