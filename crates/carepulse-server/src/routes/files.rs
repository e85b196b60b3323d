//! Serving stored files from the local backend.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/storage/buckets/{bucket_id}/files/{file_id}/view",
        get(view_file),
    )
}

/// Serve a stored file's content with its recorded type.
async fn view_file(
    State(state): State<AppState>,
    Path((bucket_id, file_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let backend = state.actions.backend();
    let meta = backend.get_file(&bucket_id, &file_id).await?;
    let bytes = backend.get_file_view(&bucket_id, &file_id).await?;
    Ok(([(header::CONTENT_TYPE, meta.mime_type)], bytes))
}
