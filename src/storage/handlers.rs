//! Storage API Handlers
//!
//! The client-facing `/storage/{key}` pair and the internal `/transfer`
//! bulk hand-off. Routing (serve locally vs forward to the owner) lives
//! in the node's request path; these handlers only translate HTTP.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::NodeError;
use crate::node::ChordNode;
use crate::rpc::protocol::KeyValue;

/// Accumulated forward count of a recursive lookup; absent means zero.
#[derive(Debug, Deserialize)]
pub struct HopsQuery {
    hops: Option<u32>,
}

/// GET `/storage/{key}`: the value as plain text, or 404.
pub async fn handle_get_value(
    Extension(node): Extension<Arc<ChordNode>>,
    Path(key): Path<String>,
    Query(query): Query<HopsQuery>,
) -> Result<String, NodeError> {
    node.guard()?;
    node.lookup_get(&key, query.hops.unwrap_or(0)).await
}

/// PUT `/storage/{key}` with the value as the body. Write-once: 403 when
/// the key already holds a value.
pub async fn handle_put_value(
    Extension(node): Extension<Arc<ChordNode>>,
    Path(key): Path<String>,
    Query(query): Query<HopsQuery>,
    body: String,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    node.lookup_put(&key, body, query.hops.unwrap_or(0)).await?;
    Ok(StatusCode::OK)
}

/// POST `/transfer`: bulk insert of entries handed off by a peer.
/// Existing keys win; the store stays write-once.
pub async fn handle_transfer(
    Extension(node): Extension<Arc<ChordNode>>,
    body: String,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    let entries: Vec<KeyValue> = serde_json::from_str(&body)
        .map_err(|e| NodeError::BadRequest(format!("invalid JSON: {}", e)))?;
    let count = entries.len();
    for entry in entries {
        node.store().put_if_absent(&entry.key, entry.value);
    }
    tracing::debug!(count, "accepted transferred keys");
    Ok(StatusCode::OK)
}
