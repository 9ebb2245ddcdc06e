use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::models::MessageResponse;
use crate::AppState;

/// The `file` part of an upload form
struct FilePart {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

fn form_error(err: impl std::fmt::Display) -> GatewayError {
    warn!("Error parsing form data: {}", err);
    GatewayError::bad_request("Unable to parse form")
}

/// Handle `POST /upload`
///
/// Expects a multipart form with a `bucket` text field and a `file` part. The
/// object key is the submitted filename, used verbatim.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> GatewayResult<Json<MessageResponse>> {
    info!("Handling file upload request");

    let mut multipart = multipart.map_err(form_error)?;
    let mut bucket: Option<String> = None;
    let mut file: Option<FilePart> = None;

    // The body limit layer caps the whole stream, so reading a part past
    // the cap fails here rather than buffering it. The first `bucket` and the
    // first `file` part carrying a filename win; repeats are skipped.
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        match (name.as_str(), filename) {
            ("bucket", _) if bucket.is_none() => {
                bucket = Some(field.text().await.map_err(form_error)?);
            }
            ("file", Some(filename)) if file.is_none() => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(form_error)?;
                file = Some(FilePart {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => debug!("Ignoring form field: {}", name),
        }
    }

    let bucket = match bucket {
        Some(bucket) if !bucket.is_empty() => bucket,
        _ => {
            warn!("Bucket name is missing in the request");
            return Err(GatewayError::bad_request("Bucket name is required"));
        }
    };
    info!("Received bucket name: {}", bucket);

    let Some(FilePart {
        filename: key,
        content_type,
        data,
    }) = file
    else {
        warn!("File part is missing in the request");
        return Err(GatewayError::bad_request("File is required"));
    };
    let size = data.len() as u64;
    info!("Received file: {}, size: {} bytes", key, size);

    let uploaded = state
        .store
        .put_object(&bucket, &key, data, size, content_type)
        .await
        .map_err(|e| {
            error!("Failed to upload file: {}", e);
            GatewayError::Upload(e)
        })?;

    info!(
        "File uploaded successfully: {} to bucket {}, size: {} bytes",
        uploaded.key, uploaded.bucket, uploaded.size
    );

    Ok(Json(MessageResponse {
        message: format!(
            "Uploaded {} to bucket {}, size: {} bytes",
            uploaded.key, uploaded.bucket, uploaded.size
        ),
    }))
}
