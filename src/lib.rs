//! Olas Storefront
//!
//! Catalog service for a small accessories shop.
//!
//! ## Features
//! - Product catalog management (list, get, create, update, delete)
//! - Bulk import from CSV or JSON files
//! - Product image upload through Cloudinary
//! - Local cart and favorites lists for the storefront client

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod import;
pub mod media;
pub mod store;

use thiserror::Error;
use validator::ValidationErrors;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid product id")]
    InvalidIdentifier,

    #[error("Product not found")]
    NotFound,

    #[error("Invalid import file: {0}")]
    Parse(String),

    #[error("Unsupported format `{0}`, use .csv or .json")]
    UnsupportedFormat(String),

    #[error("No products provided")]
    EmptyImport,

    #[error("{0}")]
    Store(String),
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        let reasons: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        CatalogError::Validation(reasons.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
