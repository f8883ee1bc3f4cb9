//! In-memory transport for tests.
//!
//! Nodes register under their address and calls are delivered straight
//! into their methods, which makes multi-node protocol scenarios
//! deterministic: no sockets, no timers, no real clock. Crashed and
//! leaving nodes refuse calls with 503 exactly like the HTTP surface, and
//! unregistered addresses behave like connection-refused peers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::protocol::KeyValue;
use super::{PeerRpc, RpcError};
use crate::error::NodeError;
use crate::node::ChordNode;
use crate::ring::{NodeAddress, NodeInfo};

#[derive(Default)]
pub struct InMemoryRpc {
    nodes: RwLock<HashMap<String, Arc<ChordNode>>>,
}

impl InMemoryRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, node: Arc<ChordNode>) {
        self.nodes
            .write()
            .unwrap()
            .insert(node.address().address.clone(), node);
    }

    /// Drop a node from the network entirely, like a process kill.
    pub fn unregister(&self, address: &str) {
        self.nodes.write().unwrap().remove(address);
    }

    fn serving(&self, peer: &str) -> Result<Arc<ChordNode>, RpcError> {
        let node = self
            .nodes
            .read()
            .unwrap()
            .get(peer)
            .cloned()
            .ok_or_else(|| RpcError::Unreachable(format!("connection refused: {}", peer)))?;
        if node.is_crashed() || node.is_leaving() {
            return Err(RpcError::Status(503));
        }
        Ok(node)
    }
}

fn to_rpc(err: NodeError) -> RpcError {
    RpcError::Status(err.status().as_u16())
}

#[async_trait]
impl PeerRpc for InMemoryRpc {
    async fn find_successor(&self, peer: &str, id: u64, hops: u32) -> Result<NodeAddress, RpcError> {
        let node = self.serving(peer)?;
        node.find_successor(id, hops).await.map_err(to_rpc)
    }

    async fn node_info(&self, peer: &str) -> Result<NodeInfo, RpcError> {
        Ok(self.serving(peer)?.info())
    }

    async fn notify(&self, peer: &str, from: NodeAddress) -> Result<(), RpcError> {
        let node = self.serving(peer)?;
        if let Some(plan) = node.notify_received(from) {
            node.run_handoff(plan).await;
        }
        Ok(())
    }

    async fn update_successor(&self, peer: &str, successor: NodeAddress) -> Result<(), RpcError> {
        self.serving(peer)?.set_successor(successor);
        Ok(())
    }

    async fn update_predecessor(
        &self,
        peer: &str,
        predecessor: NodeAddress,
    ) -> Result<(), RpcError> {
        let node = self.serving(peer)?;
        if predecessor == *node.address() {
            node.set_predecessor(None);
        } else {
            node.set_predecessor(Some(predecessor));
        }
        Ok(())
    }

    async fn get_value(&self, peer: &str, key: &str, hops: u32) -> Result<Option<String>, RpcError> {
        let node = self.serving(peer)?;
        match node.lookup_get(key, hops).await {
            Ok(value) => Ok(Some(value)),
            Err(NodeError::KeyNotFound) => Ok(None),
            Err(e) => Err(to_rpc(e)),
        }
    }

    async fn put_value(
        &self,
        peer: &str,
        key: &str,
        value: String,
        hops: u32,
    ) -> Result<(), RpcError> {
        let node = self.serving(peer)?;
        node.lookup_put(key, value, hops).await.map_err(to_rpc)
    }

    async fn transfer(&self, peer: &str, entries: Vec<KeyValue>) -> Result<(), RpcError> {
        let node = self.serving(peer)?;
        for entry in entries {
            node.store().put_if_absent(&entry.key, entry.value);
        }
        Ok(())
    }
}
