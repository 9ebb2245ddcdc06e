use axum::{
    extract::{Query, State},
    Json,
};
use futures::TryStreamExt;
use tracing::{debug, error, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::models::{first_param, ListObjectsResponse, QueryPairs};
use crate::AppState;

/// Handle `GET /list?bucket=`
///
/// Flattens nested prefixes into full keys. Any error from the backend
/// aborts the whole listing.
pub async fn list_objects(
    State(state): State<AppState>,
    Query(query): Query<QueryPairs>,
) -> GatewayResult<Json<ListObjectsResponse>> {
    info!("Handling list objects request");

    let bucket = first_param(&query, "bucket").filter(|b| !b.is_empty()).ok_or_else(|| {
        warn!("Bucket name is missing in the request");
        GatewayError::bad_request("Bucket name is required")
    })?;
    info!("Listing objects in bucket {}", bucket);

    let mut listing = state.store.list_objects(bucket, true);
    let mut objects = Vec::new();

    while let Some(entry) = listing.try_next().await.map_err(|e| {
        error!("Error listing objects in bucket {}: {}", bucket, e);
        GatewayError::List(e)
    })? {
        debug!("Found object: {}", entry.key);
        objects.push(entry.key);
    }

    Ok(Json(ListObjectsResponse {
        message: format!("Listed {} objects in bucket {}", objects.len(), bucket),
        objects,
    }))
}
