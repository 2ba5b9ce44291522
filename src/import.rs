//! Bulk import: file text → loose records → `NewProduct`.
//!
//! Parsing and normalization are separate stages. Parsing only shapes the text
//! into [`RawImportRecord`]s; [`RawImportRecord::normalize`] applies the import
//! defaults and hands the result to the store, which validates it.

use std::path::Path;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use crate::domain::{Category, NewProduct, Sku};
use crate::{CatalogError, Result};

/// One product-like entry as found in an import file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawImportRecord {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Strings pass through; numbers and booleans become their text form.
/// Anything else is treated as absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Body of `POST /products/import`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub products: Vec<RawImportRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportFormat { Csv, Json }

impl ImportFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = Path::new(file_name).extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(CatalogError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Parses a whole file, picking the format from its extension.
pub fn parse_file(file_name: &str, content: &str) -> Result<Vec<RawImportRecord>> {
    let records = match ImportFormat::from_file_name(file_name)? {
        ImportFormat::Csv => parse_csv(content)?,
        ImportFormat::Json => parse_json(content)?,
    };
    if records.is_empty() {
        return Err(CatalogError::EmptyImport);
    }
    tracing::debug!(file = file_name, count = records.len(), "parsed import file");
    Ok(records)
}

/// Header row names the columns. Fields are split on every comma; quotes are not special.
/// Rows without a name are dropped.
pub fn parse_csv(content: &str) -> Result<Vec<RawImportRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(content.trim().as_bytes());

    let headers: Vec<String> = reader.headers()
        .map_err(|e| CatalogError::Parse(e.to_string()))?
        .iter()
        .map(str::to_lowercase)
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (name, description, price, stock, category, sku) =
        (column("name"), column("description"), column("price"), column("stock"), column("category"), column("sku"));

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| CatalogError::Parse(e.to_string()))?;
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).filter(|v| !v.is_empty()).map(str::to_string);
        let Some(row_name) = field(name) else { continue };
        records.push(RawImportRecord {
            name: Some(row_name),
            description: field(description),
            price: field(price).map(Value::String),
            stock: field(stock).map(Value::String),
            category: field(category),
            sku: field(sku),
            image: None,
        });
    }
    Ok(records)
}

/// Accepts an array of objects or a single object.
pub fn parse_json(content: &str) -> Result<Vec<RawImportRecord>> {
    let value: Value = serde_json::from_str(content).map_err(|e| CatalogError::Parse(format!("invalid JSON: {e}")))?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    items.into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| CatalogError::Parse(format!("invalid product entry: {e}"))))
        .collect()
}

fn coerce_price(value: Option<&Value>) -> f64 {
    let price = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    price.filter(|p| p.is_finite()).unwrap_or(0.0)
}

fn coerce_stock(value: Option<&Value>) -> i64 {
    let parse = |s: &str| s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64));
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)).unwrap_or(0),
        Some(Value::String(s)) => parse(s.trim()).unwrap_or(0),
        _ => 0,
    }
}

impl RawImportRecord {
    /// Applies import defaults: price and stock fall back to 0, category to
    /// `productos`, and a missing sku gets a generated placeholder.
    pub fn normalize(self) -> Result<NewProduct> {
        let category = match self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => c.parse::<Category>()?,
            None => Category::Productos,
        };
        Ok(NewProduct {
            name: self.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: coerce_price(self.price.as_ref()),
            category,
            image: self.image.filter(|i| !i.trim().is_empty()),
            stock: coerce_stock(self.stock.as_ref()),
            sku: self.sku.and_then(Sku::parse).or_else(|| Some(Sku::placeholder())),
            is_active: true,
        })
    }
}

pub fn normalize_all(records: Vec<RawImportRecord>) -> Result<Vec<NewProduct>> {
    if records.is_empty() {
        return Err(CatalogError::EmptyImport);
    }
    records.into_iter().map(RawImportRecord::normalize).collect()
}
