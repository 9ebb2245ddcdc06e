use axum::{
    body::Body,
    extract::{Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue,
    },
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use tracing::{error, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::models::{first_param, QueryPairs};
use crate::AppState;

/// Handle `GET /download?bucket=&object=`
///
/// Streams the object into the response body. Once streaming has started the
/// status is committed, so a failure from the backend is logged and the body
/// is aborted.
pub async fn download_object(
    State(state): State<AppState>,
    Query(query): Query<QueryPairs>,
) -> GatewayResult<Response> {
    info!("Handling file download request");

    let bucket = first_param(&query, "bucket").filter(|b| !b.is_empty());
    let object = first_param(&query, "object").filter(|o| !o.is_empty());
    let (bucket, object) = match (bucket, object) {
        (Some(bucket), Some(object)) => (bucket, object),
        _ => {
            warn!("Bucket or object name is missing in the request");
            return Err(GatewayError::bad_request("Bucket and object names are required"));
        }
    };

    let disposition = HeaderValue::from_bytes(format!("attachment; filename={}", object).as_bytes())
        .map_err(|_| {
            warn!("Object name cannot be used in a header: {:?}", object);
            GatewayError::bad_request("Invalid object name")
        })?;

    info!("Downloading object {} from bucket {}", object, bucket);
    let body = state.store.get_object(bucket, object).await.map_err(|e| {
        error!("Failed to download object: {}", e);
        GatewayError::Download(e)
    })?;

    info!("Streaming object data to response");
    let (bucket, object) = (bucket.to_string(), object.to_string());
    let stream = body.inspect_err(move |e| {
        error!("Error streaming object data for {}/{}: {}", bucket, object, e);
    });

    Ok((
        [
            (CONTENT_DISPOSITION, disposition),
            (CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
