use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use crate::domain::{Category, Product, ProductId, ProductInput};
use crate::import::{normalize_all, ImportRequest};
use crate::store::ProductFilter;
use crate::{CatalogError, Result};
use super::{ApiJson, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ImportResponse {
    success: bool,
    imported: usize,
    message: String,
}

pub(super) async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let filter = match p.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        None => ProductFilter::default(),
        Some(raw) => match raw.parse::<Category>() {
            Ok(category) => ProductFilter::category(category),
            // No product can carry a category outside the set.
            Err(_) => return Ok(Json(ApiResponse::data(Vec::new()))),
        },
    };
    Ok(Json(ApiResponse::data(s.store.find(&filter).await?)))
}

pub(super) async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<ApiResponse<Product>>> {
    let id = ProductId::parse(&id)?;
    let product = s.store.find_by_id(id).await?.ok_or(CatalogError::NotFound)?;
    Ok(Json(ApiResponse::data(product)))
}

pub(super) async fn create_product(State(s): State<AppState>, ApiJson(r): ApiJson<ProductInput>) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    let product = s.store.create(r.into_new_product()?).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("Product created successfully", product))))
}

pub(super) async fn update_product(State(s): State<AppState>, Path(id): Path<String>, ApiJson(r): ApiJson<ProductInput>) -> Result<Json<ApiResponse<Product>>> {
    let id = ProductId::parse(&id)?;
    let product = s.store.update_by_id(id, r.into_patch()?).await?.ok_or(CatalogError::NotFound)?;
    tracing::info!(product_id = %product.id, "product updated");
    Ok(Json(ApiResponse::with_message("Product updated successfully", product)))
}

pub(super) async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<ApiResponse<()>>> {
    let id = ProductId::parse(&id)?;
    if !s.store.delete_by_id(id).await? {
        return Err(CatalogError::NotFound);
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(ApiResponse::message("Product deleted successfully")))
}

pub(super) async fn import_products(State(s): State<AppState>, ApiJson(r): ApiJson<ImportRequest>) -> Result<(StatusCode, Json<ImportResponse>)> {
    let products = normalize_all(r.products)?;
    let imported = s.store.insert_many(products).await
        .inspect_err(|e| tracing::error!(error = %e, "product import failed"))?
        .len();
    tracing::info!(imported, "products imported");
    Ok((StatusCode::CREATED, Json(ImportResponse { success: true, imported, message: format!("{imported} products imported successfully") })))
}
