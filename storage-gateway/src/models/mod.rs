use serde::{Deserialize, Serialize};

/// Status envelope returned by the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Listing envelope; `objects` is always an array, empty for an empty bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListObjectsResponse {
    pub message: String,
    pub objects: Vec<String>,
}

/// Raw query pairs in request order. Repeated names are allowed.
pub type QueryPairs = Vec<(String, String)>;

/// First value given for `name`, if any. Later repeats are ignored.
pub fn first_param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
