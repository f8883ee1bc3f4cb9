use serde::{Deserialize, Serialize};

/// A peer on the ring: ring id plus transport endpoint.
///
/// Equality is by address; the id is derived state. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeAddress {
    pub id: u64,
    pub address: String,
}

impl NodeAddress {
    pub fn new(id: u64, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
        }
    }
}

impl PartialEq for NodeAddress {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for NodeAddress {}

impl std::fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.address)
    }
}

/// One finger-table row: the fixed arc offset and the node currently
/// believed to own it. The successor may transiently be stale or self.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerEntry {
    pub start: u64,
    pub successor: NodeAddress,
}

/// Snapshot of a node's topology view, as served by `/node-info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: u64,
    pub address: String,
    pub successor: NodeAddress,
    pub predecessor: Option<NodeAddress>,
    /// The finger table, under the name the wire format has always used.
    pub others: Vec<FingerEntry>,
}
