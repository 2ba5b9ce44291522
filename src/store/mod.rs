//! Catalog Store: durable product records.
//!
//! Every backend validates the same rules on write: non-empty name, non-negative
//! price and stock, and a sku that no other product holds.

mod memory;
mod postgres;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

use async_trait::async_trait;
use crate::domain::{Category, NewProduct, Product, ProductId, ProductPatch};
use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    /// `None` matches both active and inactive products.
    pub is_active: Option<bool>,
}

impl Default for ProductFilter {
    fn default() -> Self { Self { category: None, is_active: Some(true) } }
}

impl ProductFilter {
    pub fn category(category: Category) -> Self { Self { category: Some(category), ..Self::default() } }

    pub fn matches(&self, product: &Product) -> bool {
        self.category.map_or(true, |c| product.category == c)
            && self.is_active.map_or(true, |a| product.is_active == a)
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;
    /// Newest-created first.
    async fn find(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
    async fn update_by_id(&self, id: ProductId, patch: ProductPatch) -> Result<Option<Product>>;
    /// Physically removes the record. `false` when nothing matched.
    async fn delete_by_id(&self, id: ProductId) -> Result<bool>;
    /// All or nothing: a failing record leaves the store unchanged.
    async fn insert_many(&self, products: Vec<NewProduct>) -> Result<Vec<Product>>;
}
