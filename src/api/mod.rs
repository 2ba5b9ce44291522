//! HTTP surface of the catalog service.

mod media;
mod products;

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::media::MediaUploader;
use crate::store::CatalogStore;
use crate::CatalogError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub media: Arc<dyn MediaUploader>,
}

/// `{success, message?, data?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self { Self { success: true, message: None, data: Some(data) } }
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: Some(message.into()), data: Some(data) }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self { Self { success: true, message: Some(message.into()), data: None } }
}

/// `{success: false, error}`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidIdentifier | Self::Parse(_) | Self::UnsupportedFormat(_) | Self::EmptyImport => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(ErrorEnvelope { success: false, error: self.to_string() })).into_response()
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self { CatalogError::Parse(rejection.body_text()) }
}

/// `Json` whose rejection is answered with the catalog error envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(CatalogError))]
pub struct ApiJson<T>(pub T);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "olas-storefront"})) }))
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/import", post(products::import_products))
        .route("/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/media/upload", post(media::upload).layer(DefaultBodyLimit::max(media::MAX_UPLOAD_BYTES)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
