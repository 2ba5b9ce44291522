//! Client-local cart and favorites.
//!
//! Both lists live in a [`LocalStorage`] file as JSON-serialized arrays under
//! the `cart` and `favorites` keys. [`ClientState`] is the only accessor: each
//! mutation reads the whole blob, changes it and writes it back. There is no
//! locking; two processes sharing one file can overwrite each other.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use crate::domain::{Cart, Favorites, ProductSnapshot};

pub const CART_KEY: &str = "cart";
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("stored `{key}` is not valid: {source}")]
    Corrupt { key: String, source: serde_json::Error },

    #[error("`{0}` is not in favorites")]
    NotFavorite(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// String key/value store persisted as one JSON object. Every write rewrites the file.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|source| ClientError::Corrupt { key: path.display().to_string(), source })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, items })
    }

    pub fn get_item(&self, key: &str) -> Option<&str> { self.items.get(key).map(String::as_str) }

    pub fn set_item(&mut self, key: &str, value: String) -> ClientResult<()> {
        self.items.insert(key.to_string(), value);
        self.persist()
    }

    fn persist(&self) -> ClientResult<()> {
        let tmp = self.path.with_extension("tmp");
        let text = serde_json::to_string_pretty(&self.items)
            .map_err(|source| ClientError::Corrupt { key: self.path.display().to_string(), source })?;
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

pub struct ClientState {
    storage: LocalStorage,
}

impl ClientState {
    pub fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        Ok(Self { storage: LocalStorage::open(path)? })
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> ClientResult<T> {
        match self.storage.get_item(key) {
            None => Ok(T::default()),
            Some(blob) => serde_json::from_str(blob).map_err(|source| ClientError::Corrupt { key: key.to_string(), source }),
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> ClientResult<()> {
        let blob = serde_json::to_string(value).map_err(|source| ClientError::Corrupt { key: key.to_string(), source })?;
        self.storage.set_item(key, blob)
    }

    fn modify_cart<R>(&mut self, change: impl FnOnce(&mut Cart) -> R) -> ClientResult<R> {
        let mut cart: Cart = self.read(CART_KEY)?;
        let out = change(&mut cart);
        self.write(CART_KEY, &cart)?;
        Ok(out)
    }

    fn modify_favorites<R>(&mut self, change: impl FnOnce(&mut Favorites) -> R) -> ClientResult<R> {
        let mut favorites: Favorites = self.read(FAVORITES_KEY)?;
        let out = change(&mut favorites);
        self.write(FAVORITES_KEY, &favorites)?;
        Ok(out)
    }

    pub fn cart(&self) -> ClientResult<Cart> { self.read(CART_KEY) }

    pub fn cart_total(&self) -> ClientResult<f64> { Ok(self.cart()?.total()) }

    pub fn add_to_cart(&mut self, product: &ProductSnapshot) -> ClientResult<Cart> {
        self.modify_cart(|cart| {
            cart.add(&product.id, &product.name, product.price);
            cart.clone()
        })
    }

    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> ClientResult<Cart> {
        self.modify_cart(|cart| {
            cart.set_quantity(id, quantity);
            cart.clone()
        })
    }

    pub fn remove_from_cart(&mut self, id: &str) -> ClientResult<bool> {
        self.modify_cart(|cart| cart.remove(id))
    }

    /// Empties the cart only when `confirm` returns true. Returns whether it was cleared.
    pub fn clear_cart(&mut self, confirm: impl FnOnce() -> bool) -> ClientResult<bool> {
        if !confirm() { return Ok(false); }
        self.modify_cart(Cart::clear)?;
        Ok(true)
    }

    pub fn favorites(&self) -> ClientResult<Favorites> { self.read(FAVORITES_KEY) }

    pub fn is_favorite(&self, id: &str) -> ClientResult<bool> { Ok(self.favorites()?.contains(id)) }

    /// Returns whether the product is a favorite afterwards.
    pub fn toggle_favorite(&mut self, product: &ProductSnapshot) -> ClientResult<bool> {
        self.modify_favorites(|favs| favs.toggle(product))
    }

    pub fn remove_favorite(&mut self, id: &str) -> ClientResult<bool> {
        self.modify_favorites(|favs| favs.remove(id))
    }

    pub fn clear_favorites(&mut self, confirm: impl FnOnce() -> bool) -> ClientResult<bool> {
        if !confirm() { return Ok(false); }
        self.modify_favorites(Favorites::clear)?;
        Ok(true)
    }

    /// Adds a favorite to the cart using the snapshot taken when it was favorited.
    pub fn add_favorite_to_cart(&mut self, id: &str) -> ClientResult<Cart> {
        let favorites = self.favorites()?;
        let item = favorites.get(id).ok_or_else(|| ClientError::NotFavorite(id.to_string()))?;
        self.modify_cart(|cart| {
            cart.add(&item.id, &item.name, item.price);
            cart.clone()
        })
    }
}
