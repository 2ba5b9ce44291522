//! Cart and Favorites lists kept by the storefront client

use serde::{Deserialize, Serialize};
use super::product::Product;

/// Copy of the product fields a list entry keeps. Not refreshed when the product changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.to_string(), name: p.name.clone(), price: p.price,
            description: Some(p.description.clone()), image: p.image.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 { self.price * f64::from(self.quantity) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&ProductSnapshot> for FavoriteItem {
    fn from(s: &ProductSnapshot) -> Self {
        Self { id: s.id.clone(), name: s.name.clone(), price: s.price, description: s.description.clone(), image: s.image.clone() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn total(&self) -> f64 { self.items.iter().map(CartItem::line_total).sum() }

    /// Same id bumps the quantity, a new id is appended with quantity 1.
    pub fn add(&mut self, id: &str, name: &str, price: f64) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem { id: id.to_string(), name: name.to_string(), price, quantity: 1 });
        }
    }

    /// Sets an explicit quantity; zero or less removes the entry.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) { self.items.clear(); }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    items: Vec<FavoriteItem>,
}

impl Favorites {
    pub fn items(&self) -> &[FavoriteItem] { &self.items }
    pub fn contains(&self, id: &str) -> bool { self.items.iter().any(|i| i.id == id) }
    pub fn get(&self, id: &str) -> Option<&FavoriteItem> { self.items.iter().find(|i| i.id == id) }

    /// Returns whether the product is a favorite after the call.
    pub fn toggle(&mut self, snapshot: &ProductSnapshot) -> bool {
        if self.remove(&snapshot.id) {
            false
        } else {
            self.items.push(FavoriteItem::from(snapshot));
            true
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) { self.items.clear(); }
}
