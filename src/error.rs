//! Error model for the node.
//!
//! Every failure a handler can surface is one of these kinds; the
//! `IntoResponse` impl is the single place protocol errors become HTTP
//! statuses. Fatal startup errors (bind, bootstrap parse) stay `anyhow`
//! in the binary and never reach this type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::rpc::RpcError;

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Malformed request: bad JSON body, missing query parameter.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Identifier outside `[0, 2^m)`.
    #[error("identifier {0} outside the ring space")]
    IdOutOfRange(u64),

    /// Key absent from the ring.
    #[error("key not found")]
    KeyNotFound,

    /// Write-once violation: the key already holds a value.
    #[error("key already exists")]
    KeyExists,

    /// The node is crashed or leaving and not serving.
    #[error("node unavailable")]
    Unavailable,

    /// An RPC to a peer timed out or failed; not retried here, the
    /// maintenance loop converges instead.
    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },

    /// The forward-loop detector fired; waiting for maintenance to
    /// repair the fingers is the remedy.
    #[error("lookup exceeded {0} hops, ring unstable")]
    RingUnstable(u32),
}

impl NodeError {
    /// Wrap a transport error against a named peer.
    pub fn unreachable(peer: &str, err: RpcError) -> Self {
        match err {
            RpcError::Status(503) => NodeError::Unavailable,
            other => NodeError::PeerUnreachable {
                peer: peer.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            NodeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            NodeError::IdOutOfRange(_) => StatusCode::BAD_REQUEST,
            NodeError::KeyNotFound => StatusCode::NOT_FOUND,
            NodeError::KeyExists => StatusCode::FORBIDDEN,
            NodeError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            NodeError::PeerUnreachable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            NodeError::RingUnstable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
