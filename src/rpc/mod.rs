//! Peer RPC Module
//!
//! The narrow capability a node needs from the rest of the ring, and its
//! transports.
//!
//! Production uses [`http::HttpPeerRpc`] (reqwest with bounded timeouts);
//! tests register nodes in an in-memory transport and deliver calls
//! directly, which makes multi-node scenarios deterministic. No transport
//! retries anything: the maintenance loop is the retry mechanism.

pub mod http;
pub mod protocol;

#[cfg(test)]
pub mod mem;

use async_trait::async_trait;

use crate::ring::{NodeAddress, NodeInfo};
use protocol::KeyValue;

pub use http::HttpPeerRpc;

/// Transport-level failure talking to one peer.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("peer answered status {0}")]
    Status(u16),

    #[error("malformed peer response: {0}")]
    Decode(String),
}

/// Everything a node asks of a peer, addressed by `host:port`.
///
/// `hops` carries the accumulated forward count of a recursive lookup so
/// the receiving peer can trip the loop detector.
#[async_trait]
pub trait PeerRpc: Send + Sync {
    /// Recursive lookup: ask `peer` for the node owning `id`.
    async fn find_successor(&self, peer: &str, id: u64, hops: u32) -> Result<NodeAddress, RpcError>;

    /// Fetch the peer's topology snapshot. Doubles as the liveness probe.
    async fn node_info(&self, peer: &str) -> Result<NodeInfo, RpcError>;

    /// Stabilize hint: tell `peer` that `from` may be its predecessor.
    async fn notify(&self, peer: &str, from: NodeAddress) -> Result<(), RpcError>;

    /// Forced successor update, used by voluntary departure.
    async fn update_successor(&self, peer: &str, successor: NodeAddress) -> Result<(), RpcError>;

    /// Forced predecessor update, used by voluntary departure.
    async fn update_predecessor(&self, peer: &str, predecessor: NodeAddress)
        -> Result<(), RpcError>;

    /// Read `key` at `peer`, letting the peer route further if needed.
    /// `Ok(None)` means the ring holds no such key.
    async fn get_value(&self, peer: &str, key: &str, hops: u32) -> Result<Option<String>, RpcError>;

    /// Store `key` at `peer`, letting the peer route further if needed.
    async fn put_value(&self, peer: &str, key: &str, value: String, hops: u32)
        -> Result<(), RpcError>;

    /// Bulk key hand-off into the peer's local store.
    async fn transfer(&self, peer: &str, entries: Vec<KeyValue>) -> Result<(), RpcError>;
}
