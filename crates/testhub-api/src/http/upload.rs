//! Contract upload endpoints.
//!
//! # Design
//! - Validation (category, field, extension, size) happens before anything is stored or sent.
//! - The local copy is best-effort; only validation and deposit failures fail the request.
//! - The relay runs under a child of the shutdown token that is cancelled if the request is
//!   dropped.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path as AxumPath, State, multipart::MultipartError},
    http::StatusCode,
};
use bytes::Bytes;
use testhub_api_models::UploadResponse;
use testhub_core::{Artifact, Category, basename};
use tracing::{info, instrument, warn};

use crate::http::constants::UPLOAD_FIELD;
use crate::http::errors::ApiError;
use crate::state::ApiState;

struct UploadedFile {
    filename: String,
    contents: Bytes,
}

/// `POST /upload/{category}`.
pub(crate) async fn upload_contract(
    State(state): State<Arc<ApiState>>,
    AxumPath(category): AxumPath<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let category: Category = category.parse()?;
    handle_upload(&state, category, multipart).await
}

/// `POST /upload-evm`.
pub(crate) async fn upload_evm(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    handle_upload(&state, Category::Evm, multipart).await
}

/// `POST /upload-non-evm`.
pub(crate) async fn upload_non_evm(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    handle_upload(&state, Category::NonEvm, multipart).await
}

#[instrument(name = "upload", skip(state, multipart), fields(category = %category))]
async fn handle_upload(
    state: &ApiState,
    category: Category,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let upload = read_contract_field(multipart, state.max_upload_bytes).await?;
    category.validate_extension(&upload.filename)?;
    let artifact = Artifact::new(&upload.filename, category, upload.contents)?;
    info!(filename = artifact.name(), bytes = artifact.len(), "contract received");

    if let Some(dir) = &state.upload_dir {
        save_local_copy(dir, &artifact).await;
    }

    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();
    let submission = state.relay.submit(&artifact, &cancel).await?;
    Ok(Json(UploadResponse::from_submission(&artifact, submission)))
}

async fn read_contract_field(
    mut multipart: Multipart,
    limit: usize,
) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                ApiError::bad_request("contract_file must carry a filename")
                    .with_invalid_param("/contract_file", "missing filename")
            })?;
        let contents = field.bytes().await.map_err(multipart_error)?;
        if contents.len() > limit {
            return Err(ApiError::payload_too_large(format!(
                "contract exceeds the {limit} byte upload limit"
            )));
        }
        return Ok(UploadedFile { filename, contents });
    }
    Err(ApiError::bad_request("multipart field contract_file is required")
        .with_invalid_param("/contract_file", "missing field"))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

async fn save_local_copy(dir: &Path, artifact: &Artifact) {
    let target_dir = dir.join(artifact.category().as_str());
    let target = target_dir.join(basename(artifact.name()));
    let result = async {
        tokio::fs::create_dir_all(&target_dir).await?;
        tokio::fs::write(&target, artifact.bytes()).await
    }
    .await;
    if let Err(err) = result {
        warn!(path = %target.display(), error = %err, "failed to save local upload copy");
    }
}
