//! Value Objects for the catalog

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::CatalogError;

/// Store-assigned product identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    pub fn generate() -> Self { Self(Uuid::now_v7()) }
    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|_| CatalogError::InvalidIdentifier)
    }
    pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl From<Uuid> for ProductId { fn from(id: Uuid) -> Self { Self(id) } }

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Fixed set of storefront categories. `descuentos` is the storefront's label for `ofertas`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Material,
    #[default]
    Productos,
    #[serde(alias = "descuentos")]
    Ofertas,
    Novedades,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Productos => "productos",
            Self::Ofertas => "ofertas",
            Self::Novedades => "novedades",
        }
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "material" => Ok(Self::Material),
            "productos" => Ok(Self::Productos),
            "ofertas" | "descuentos" => Ok(Self::Ofertas),
            "novedades" => Ok(Self::Novedades),
            other => Err(CatalogError::Validation(format!("`{other}` is not a valid category"))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Trimmed sku, or `None` when nothing is left.
    pub fn parse(value: impl AsRef<str>) -> Option<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() { None } else { Some(Self(value.to_string())) }
    }

    /// `SKU-<unix millis>-<random>` for imported rows that carry no sku.
    pub fn placeholder() -> Self {
        Self(format!("SKU-{}-{}", Utc::now().timestamp_millis(), rand::random::<u32>()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
