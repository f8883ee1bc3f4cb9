//! Routing core and the client request path.
//!
//! `find_successor` is the lookup primitive everything else is built on:
//! one local interval test, then a recursive RPC through the closest
//! preceding finger. The accumulated hop count travels with the lookup and
//! trips the loop detector when stale fingers send a query in circles.

use crate::error::NodeError;
use crate::ring::{in_half_open_right, in_open, NodeAddress};
use crate::rpc::RpcError;
use crate::storage::PutOutcome;

use super::state::ChordNode;

impl ChordNode {
    /// Resolve the node owning `id`.
    ///
    /// Answers from the local successor pointer when `id` falls in
    /// `(self, successor]`; otherwise delegates to the closest preceding
    /// finger, falling back to the successor when no finger precedes `id`.
    pub async fn find_successor(&self, id: u64, hops: u32) -> Result<NodeAddress, NodeError> {
        if !self.space().contains(id) {
            return Err(NodeError::IdOutOfRange(id));
        }
        if hops > self.space().max_hops() {
            return Err(NodeError::RingUnstable(hops));
        }

        let successor = self.successor();
        if in_half_open_right(self.address().id, id, successor.id) {
            return Ok(successor);
        }

        let next = self.closest_preceding_node(id);
        if next == *self.address() {
            return Ok(successor);
        }

        self.rpc()
            .find_successor(&next.address, id, hops + 1)
            .await
            .map_err(|e| NodeError::unreachable(&next.address, e))
    }

    /// Scan the finger table from the top down for the first node lying
    /// strictly between self and `id`. Entries still pointing at self
    /// never qualify.
    pub fn closest_preceding_node(&self, id: u64) -> NodeAddress {
        for i in (0..self.space().bits()).rev() {
            let finger = self.finger_successor(i);
            if in_open(self.address().id, finger.id, id) {
                return finger;
            }
        }
        self.address().clone()
    }

    /// Whether `id` falls in the arc this node stores, `(predecessor, self]`.
    /// A node without a predecessor is alone and owns every id.
    pub fn owns_id(&self, id: u64) -> bool {
        match self.predecessor() {
            None => true,
            Some(p) => in_half_open_right(p.id, id, self.address().id),
        }
    }

    /// GET request path: serve locally when the key is ours, otherwise
    /// forward to the predicted owner and relay its answer.
    pub async fn lookup_get(&self, key: &str, hops: u32) -> Result<String, NodeError> {
        let id = self.space().hash(key);
        if !self.space().contains(id) {
            return Err(NodeError::KeyNotFound);
        }

        if self.owns_id(id) {
            return self.store().get(key).ok_or(NodeError::KeyNotFound);
        }

        let owner = self.find_successor(id, hops).await?;
        if owner == *self.address() {
            // Stale routing resolved back to us; answer from the store.
            return self.store().get(key).ok_or(NodeError::KeyNotFound);
        }

        tracing::debug!(key, id, owner = %owner, "forwarding GET");
        match self.rpc().get_value(&owner.address, key, hops + 1).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(NodeError::KeyNotFound),
            Err(e) => Err(relay_error(&owner.address, e)),
        }
    }

    /// PUT request path. Keys are write-once: storing over an existing
    /// key is a conflict wherever it ends up being handled.
    pub async fn lookup_put(&self, key: &str, value: String, hops: u32) -> Result<(), NodeError> {
        let id = self.space().hash(key);
        if !self.space().contains(id) {
            return Err(NodeError::KeyNotFound);
        }

        if self.owns_id(id) {
            return self.store_local(key, value);
        }

        let owner = self.find_successor(id, hops).await?;
        if owner == *self.address() {
            return self.store_local(key, value);
        }

        tracing::debug!(key, id, owner = %owner, "forwarding PUT");
        self.rpc()
            .put_value(&owner.address, key, value, hops + 1)
            .await
            .map_err(|e| relay_error(&owner.address, e))
    }

    fn store_local(&self, key: &str, value: String) -> Result<(), NodeError> {
        match self.store().put_if_absent(key, value) {
            PutOutcome::Inserted => Ok(()),
            PutOutcome::AlreadyPresent => Err(NodeError::KeyExists),
        }
    }
}

/// Map a forwarded request's failure so the peer's status relays to the
/// client unchanged.
fn relay_error(peer: &str, err: RpcError) -> NodeError {
    match err {
        RpcError::Status(403) => NodeError::KeyExists,
        RpcError::Status(404) => NodeError::KeyNotFound,
        RpcError::Status(503) => NodeError::Unavailable,
        other => NodeError::PeerUnreachable {
            peer: peer.to_string(),
            reason: other.to_string(),
        },
    }
}
