//! Catalog domain: products, their value objects, and the client-side lists.
pub mod aggregates;
pub mod value_objects;

pub use aggregates::{Cart, CartItem, FavoriteItem, Favorites, NewProduct, Product, ProductInput, ProductPatch, ProductSnapshot};
pub use value_objects::{Category, ProductId, Sku};
