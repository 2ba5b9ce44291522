//! Aggregates module
pub mod product;
pub mod cart;

pub use product::{NewProduct, Product, ProductInput, ProductPatch};
pub use cart::{Cart, CartItem, FavoriteItem, Favorites, ProductSnapshot};
