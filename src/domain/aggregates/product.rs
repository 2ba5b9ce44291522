//! Product Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::{Category, ProductId, Sku};
use crate::{CatalogError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body accepted by create and update, before any field is checked.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i64>,
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}

/// Complete field set for a product that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub category: Category,
    pub image: Option<String>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i64,
    pub sku: Option<Sku>,
    pub is_active: bool,
}

/// Partial update. `None` keeps the stored value; `is_active` is always written.
#[derive(Clone, Debug, PartialEq, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub image: Option<String>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: Option<i64>,
    pub sku: Option<Sku>,
    pub is_active: bool,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| CatalogError::Validation(format!("{field} is required")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ProductInput {
    pub fn into_new_product(self) -> Result<NewProduct> {
        let name = required(self.name, "name")?.trim().to_string();
        let price = required(self.price, "price")?;
        let category = required(self.category, "category")?.parse::<Category>()?;
        Ok(NewProduct {
            name,
            description: self.description.unwrap_or_default(),
            price,
            category,
            image: non_empty(self.image),
            stock: self.stock.unwrap_or(0),
            sku: self.sku.and_then(Sku::parse),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    pub fn into_patch(self) -> Result<ProductPatch> {
        let category = self.category.map(|c| c.parse::<Category>()).transpose()?;
        Ok(ProductPatch {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description,
            price: self.price,
            category,
            image: non_empty(self.image),
            stock: self.stock,
            sku: self.sku.and_then(Sku::parse),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

impl NewProduct {
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id, name: self.name, description: self.description, price: self.price,
            category: self.category, image: self.image, stock: self.stock, sku: self.sku,
            is_active: self.is_active, created_at: now, updated_at: now,
        }
    }
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name { product.name = name; }
        if let Some(description) = self.description { product.description = description; }
        if let Some(price) = self.price { product.price = price; }
        if let Some(category) = self.category { product.category = category; }
        if let Some(image) = self.image { product.image = Some(image); }
        if let Some(stock) = self.stock { product.stock = stock; }
        if let Some(sku) = self.sku { product.sku = Some(sku); }
        product.is_active = self.is_active;
        product.updated_at = now;
    }
}
