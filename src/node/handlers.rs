//! Topology & Membership API Handlers
//!
//! HTTP endpoints for liveness, topology inspection, recursive lookup,
//! and ring membership changes. These translate requests into
//! [`ChordNode`] calls and map [`NodeError`] onto statuses; while the
//! node is crashed everything here except `/sim-recover` answers 503.
//!
//! The forced-update and notify bodies are decoded by hand so malformed
//! JSON is a plain 400 regardless of extractor defaults.

use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::NodeError;
use crate::ring::NodeAddress;

use super::ChordNode;

#[derive(Debug, Deserialize)]
pub struct SuccessorQuery {
    successor: Option<String>,
    hops: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    nprime: Option<String>,
}

/// Liveness probe: the node's own `host:port` as plain text.
pub async fn handle_helloworld(
    Extension(node): Extension<Arc<ChordNode>>,
) -> Result<String, NodeError> {
    node.guard()?;
    Ok(node.address().address.clone())
}

/// The addresses this node currently knows, from its finger table.
pub async fn handle_network(
    Extension(node): Extension<Arc<ChordNode>>,
) -> Result<Json<Vec<String>>, NodeError> {
    node.guard()?;
    Ok(Json(node.known_addresses()))
}

/// Without a query: this node's topology snapshot. With `?successor={id}`:
/// recursive lookup of the node owning `id`.
pub async fn handle_node_info(
    Extension(node): Extension<Arc<ChordNode>>,
    Query(query): Query<SuccessorQuery>,
) -> Result<Response, NodeError> {
    node.guard()?;

    let Some(raw_id) = query.successor else {
        return Ok(Json(node.info()).into_response());
    };

    let id: u64 = raw_id
        .parse()
        .map_err(|_| NodeError::BadRequest(format!("invalid successor id {:?}", raw_id)))?;
    let owner = node.find_successor(id, query.hops.unwrap_or(0)).await?;
    Ok(Json(owner).into_response())
}

/// Join the ring through the peer named by `?nprime=`.
pub async fn handle_join(
    Extension(node): Extension<Arc<ChordNode>>,
    Query(query): Query<JoinQuery>,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    let nprime = query
        .nprime
        .ok_or_else(|| NodeError::BadRequest("missing nprime".to_string()))?;
    node.join(&nprime).await?;
    Ok(StatusCode::OK)
}

/// Voluntary departure; the process shuts down once the response is sent.
pub async fn handle_leave(
    Extension(node): Extension<Arc<ChordNode>>,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    node.leave().await?;
    Ok(StatusCode::OK)
}

pub async fn handle_sim_crash(
    Extension(node): Extension<Arc<ChordNode>>,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    node.crash();
    Ok(StatusCode::OK)
}

/// The only endpoint served while crashed.
pub async fn handle_sim_recover(Extension(node): Extension<Arc<ChordNode>>) -> StatusCode {
    node.recover().await;
    StatusCode::OK
}

/// Forced successor update, used by a departing predecessor.
pub async fn handle_update_successor(
    Extension(node): Extension<Arc<ChordNode>>,
    body: String,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    let successor = decode_address(&body)?;
    node.set_successor(successor);
    Ok(StatusCode::OK)
}

/// Forced predecessor update, used by a departing successor. Being told
/// our own address means we are alone again, which the state models as
/// an absent predecessor.
pub async fn handle_update_predecessor(
    Extension(node): Extension<Arc<ChordNode>>,
    body: String,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    let predecessor = decode_address(&body)?;
    if predecessor == *node.address() {
        node.set_predecessor(None);
    } else {
        node.set_predecessor(Some(predecessor));
    }
    Ok(StatusCode::OK)
}

/// Stabilize hint from a peer that believes it precedes us.
pub async fn handle_notify(
    Extension(node): Extension<Arc<ChordNode>>,
    body: String,
) -> Result<StatusCode, NodeError> {
    node.guard()?;
    let candidate = decode_address(&body)?;
    if let Some(plan) = node.notify_received(candidate) {
        node.run_handoff(plan).await;
    }
    Ok(StatusCode::OK)
}

fn decode_address(body: &str) -> Result<NodeAddress, NodeError> {
    serde_json::from_str(body).map_err(|e| NodeError::BadRequest(format!("invalid JSON: {}", e)))
}
