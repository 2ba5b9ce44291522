use axum::{
    extract::{multipart::MultipartRejection, FromRequest, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use crate::media::{MediaError, UploadedMedia};
use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct UploadResponse {
    success: bool,
    #[serde(flatten)]
    media: UploadedMedia,
}

#[derive(Debug, Serialize)]
struct MediaErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Largest accepted upload body.
pub(super) const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl From<MultipartRejection> for MediaError {
    fn from(rejection: MultipartRejection) -> Self { MediaError::Multipart(rejection.body_text()) }
}

/// `Multipart` whose rejection is answered with the media error shape.
#[derive(FromRequest)]
#[from_request(rejection(MediaError))]
pub(super) struct UploadForm(Multipart);

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            MediaError::NoFile => (StatusCode::BAD_REQUEST, "No file provided"),
            MediaError::Multipart(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
            MediaError::NotConfigured | MediaError::Request(_) | MediaError::Rejected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Upload failed")
            }
        };
        let details = match self {
            MediaError::NoFile => None,
            other => {
                tracing::error!(error = %other, "media upload failed");
                Some(other.to_string())
            }
        };
        (status, Json(MediaErrorBody { error, details })).into_response()
    }
}

/// POST /media/upload, multipart field `file`
pub(super) async fn upload(State(s): State<AppState>, UploadForm(mut multipart): UploadForm) -> Result<Json<UploadResponse>, MediaError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| MediaError::Multipart(e.body_text()))? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(|e| MediaError::Multipart(e.body_text()))?;
        if bytes.is_empty() {
            return Err(MediaError::NoFile);
        }
        let media = s.media.upload(&file_name, bytes.to_vec()).await?;
        return Ok(Json(UploadResponse { success: true, media }));
    }
    Err(MediaError::NoFile)
}
