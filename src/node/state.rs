use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::error::NodeError;
use crate::ring::{FingerEntry, KeySpace, NodeAddress, NodeInfo};
use crate::rpc::PeerRpc;
use crate::storage::KeyStore;

/// One finger-table slot. `start` is fixed for the life of the node and
/// may be read without synchronization; only the successor pointer moves.
struct Finger {
    start: u64,
    successor: RwLock<NodeAddress>,
}

/// State of a single ring participant.
///
/// Shared by every request handler and the maintenance loop. Pointer
/// reads copy the value out; mutations swap it under the same lock, so
/// observers always see a complete address some earlier step installed.
pub struct ChordNode {
    addr: NodeAddress,
    space: KeySpace,
    successor: RwLock<NodeAddress>,
    predecessor: RwLock<Option<NodeAddress>>,
    fingers: Vec<Finger>,
    store: KeyStore,
    crashed: AtomicBool,
    leaving: AtomicBool,
    /// Neighbor recorded when entering the crashed state, used for the
    /// best-effort re-join on recovery.
    remembered: RwLock<Option<NodeAddress>>,
    rpc: Arc<dyn PeerRpc>,
    shutdown: watch::Sender<bool>,
}

impl ChordNode {
    /// Founding member of a fresh ring: successor is self, predecessor
    /// absent, every finger pointing at self.
    pub fn new(addr: NodeAddress, space: KeySpace, rpc: Arc<dyn PeerRpc>) -> Arc<Self> {
        let fingers = (0..space.bits())
            .map(|i| Finger {
                start: space.finger_start(addr.id, i),
                successor: RwLock::new(addr.clone()),
            })
            .collect();

        let (shutdown, _) = watch::channel(false);

        Arc::new(Self {
            successor: RwLock::new(addr.clone()),
            predecessor: RwLock::new(None),
            fingers,
            store: KeyStore::new(space),
            crashed: AtomicBool::new(false),
            leaving: AtomicBool::new(false),
            remembered: RwLock::new(None),
            rpc,
            shutdown,
            addr,
            space,
        })
    }

    /// Node with pointers restored from a bootstrap file entry.
    pub fn with_state(
        addr: NodeAddress,
        space: KeySpace,
        rpc: Arc<dyn PeerRpc>,
        successor: NodeAddress,
        predecessor: Option<NodeAddress>,
        finger_successors: Vec<NodeAddress>,
    ) -> Arc<Self> {
        let node = Self::new(addr, space, rpc);
        node.set_successor(successor);
        node.set_predecessor(predecessor);
        for (i, owner) in finger_successors.into_iter().enumerate() {
            node.set_finger(i as u32, owner);
        }
        node
    }

    pub fn address(&self) -> &NodeAddress {
        &self.addr
    }

    pub fn space(&self) -> KeySpace {
        self.space
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    pub fn rpc(&self) -> &Arc<dyn PeerRpc> {
        &self.rpc
    }

    pub fn successor(&self) -> NodeAddress {
        self.successor.read().unwrap().clone()
    }

    pub fn set_successor(&self, successor: NodeAddress) {
        *self.successor.write().unwrap() = successor;
    }

    pub fn predecessor(&self) -> Option<NodeAddress> {
        self.predecessor.read().unwrap().clone()
    }

    pub fn set_predecessor(&self, predecessor: Option<NodeAddress>) {
        *self.predecessor.write().unwrap() = predecessor;
    }

    /// Clear the predecessor only if it still is the one that was probed,
    /// so a concurrent adoption is not thrown away.
    pub fn clear_predecessor_if(&self, expected: &NodeAddress) {
        let mut predecessor = self.predecessor.write().unwrap();
        if predecessor.as_ref() == Some(expected) {
            *predecessor = None;
        }
    }

    /// Adopt `candidate` as predecessor iff none is known or it falls in
    /// the open arc `(predecessor, self)`. Returns the replaced value on
    /// adoption, `None` when the candidate was rejected.
    pub fn adopt_predecessor(&self, candidate: NodeAddress) -> Option<Option<NodeAddress>> {
        let mut predecessor = self.predecessor.write().unwrap();
        let adopt = match predecessor.as_ref() {
            None => true,
            Some(p) => crate::ring::in_open(p.id, candidate.id, self.addr.id),
        };
        if adopt {
            Some(predecessor.replace(candidate))
        } else {
            None
        }
    }

    pub fn finger_start(&self, i: u32) -> u64 {
        self.fingers[i as usize].start
    }

    pub fn finger_successor(&self, i: u32) -> NodeAddress {
        self.fingers[i as usize].successor.read().unwrap().clone()
    }

    pub fn set_finger(&self, i: u32, successor: NodeAddress) {
        *self.fingers[i as usize].successor.write().unwrap() = successor;
    }

    /// Snapshot of the finger table as served over the wire.
    pub fn finger_table(&self) -> Vec<FingerEntry> {
        self.fingers
            .iter()
            .map(|f| FingerEntry {
                start: f.start,
                successor: f.successor.read().unwrap().clone(),
            })
            .collect()
    }

    /// Distinct peer addresses the node currently knows, in finger order.
    pub fn known_addresses(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for finger in &self.fingers {
            let address = finger.successor.read().unwrap().address.clone();
            if !seen.contains(&address) {
                seen.push(address);
            }
        }
        seen
    }

    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            id: self.addr.id,
            address: self.addr.address.clone(),
            successor: self.successor(),
            predecessor: self.predecessor(),
            others: self.finger_table(),
        }
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    pub fn set_crashed(&self, crashed: bool) {
        self.crashed.store(crashed, Ordering::SeqCst);
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving.load(Ordering::SeqCst)
    }

    pub fn set_leaving(&self) {
        self.leaving.store(true, Ordering::SeqCst);
    }

    /// Refuse service while crashed or departing. Every handler except
    /// `/sim-recover` goes through this first.
    pub fn guard(&self) -> Result<(), NodeError> {
        if self.is_crashed() || self.is_leaving() {
            Err(NodeError::Unavailable)
        } else {
            Ok(())
        }
    }

    pub fn remembered(&self) -> Option<NodeAddress> {
        self.remembered.read().unwrap().clone()
    }

    pub fn remember(&self, neighbor: Option<NodeAddress>) {
        *self.remembered.write().unwrap() = neighbor;
    }

    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}
