//! In-process store, used when no database is configured and in tests.

use std::collections::HashSet;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use validator::Validate;
use crate::domain::{NewProduct, Product, ProductId, ProductPatch, Sku};
use crate::{CatalogError, Result};
use super::{CatalogStore, ProductFilter};

/// Products in creation order.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self { Self::default() }
}

fn duplicate_sku(sku: &Sku) -> CatalogError {
    CatalogError::Validation(format!("sku `{sku}` already exists"))
}

fn check_sku(products: &[Product], sku: Option<&Sku>, except: Option<ProductId>) -> Result<()> {
    let Some(sku) = sku else { return Ok(()) };
    let taken = products.iter().any(|p| Some(p.id) != except && p.sku.as_ref() == Some(sku));
    if taken { Err(duplicate_sku(sku)) } else { Ok(()) }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;
        let mut products = self.products.write().await;
        check_sku(&products, product.sku.as_ref(), None)?;
        let created = product.into_product(ProductId::generate(), Utc::now());
        products.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().rev().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn update_by_id(&self, id: ProductId, patch: ProductPatch) -> Result<Option<Product>> {
        patch.validate()?;
        let mut products = self.products.write().await;
        let Some(index) = products.iter().position(|p| p.id == id) else { return Ok(None) };
        check_sku(&products, patch.sku.as_ref(), Some(id))?;
        let product = &mut products[index];
        patch.apply(product, Utc::now());
        Ok(Some(product.clone()))
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    async fn insert_many(&self, batch: Vec<NewProduct>) -> Result<Vec<Product>> {
        let mut products = self.products.write().await;
        let mut seen = HashSet::new();
        for product in &batch {
            product.validate()?;
            check_sku(&products, product.sku.as_ref(), None)?;
            if let Some(sku) = &product.sku {
                if !seen.insert(sku.clone()) { return Err(duplicate_sku(sku)); }
            }
        }
        let now = Utc::now();
        let created: Vec<Product> = batch.into_iter().map(|p| p.into_product(ProductId::generate(), now)).collect();
        products.extend(created.iter().cloned());
        Ok(created)
    }
}
