use std::sync::Arc;
use std::time::Duration;

use crate::node::ChordNode;
use crate::ring::{in_open, NodeAddress};

/// Runs the periodic maintenance cycle for one node.
///
/// `tick` is public so tests can drive the protocol with a virtual clock
/// instead of waiting on the timer.
pub struct Maintainer {
    node: Arc<ChordNode>,
}

impl Maintainer {
    pub fn new(node: Arc<ChordNode>) -> Self {
        Self { node }
    }

    /// Timer loop. Skips ticks while the node is crashed or leaving (a
    /// crashed node sends no outgoing RPCs) and observes shutdown between
    /// ticks.
    pub async fn run(self, period: Duration) {
        let mut shutdown = self.node.shutdown_receiver();
        let mut interval = tokio::time::interval(period);
        // The first tick of a tokio interval fires immediately; the ring
        // should settle on the configured cadence instead.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.node.is_crashed() || self.node.is_leaving() {
                        continue;
                    }
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    tracing::debug!("maintenance loop stopping");
                    break;
                }
            }
        }
    }

    /// One full maintenance round.
    pub async fn tick(&self) {
        self.stabilize().await;
        self.fix_fingers().await;
        self.check_predecessor().await;
    }

    /// Ask the successor for its predecessor `x`; adopt `x` when it lies
    /// in `(self, successor)`, then notify the (possibly new) successor.
    ///
    /// A self-successor is handled locally: its predecessor is our own,
    /// and adoption is unconditional since the `(a, a)` arc is empty.
    /// This is what lets a one-node ring grow after a join.
    async fn stabilize(&self) {
        let node = &self.node;
        let successor = node.successor();

        if successor == *node.address() {
            if let Some(x) = node.predecessor() {
                if x != *node.address() {
                    tracing::info!(successor = %x, "stabilize: adopting predecessor as successor");
                    node.set_successor(x);
                }
            }
            return;
        }

        match node.rpc().node_info(&successor.address).await {
            Ok(info) => {
                if let Some(x) = info.predecessor {
                    if in_open(node.address().id, x.id, successor.id) {
                        tracing::info!(successor = %x, "stabilize: adopting closer successor");
                        node.set_successor(x);
                    }
                }
                let current = node.successor();
                if let Err(e) = node.rpc().notify(&current.address, node.address().clone()).await {
                    tracing::debug!(peer = %current, "notify failed: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!(peer = %successor, "stabilize: successor unreachable: {}", e);
                self.replace_failed_successor(&successor).await;
            }
        }
    }

    /// Heal a dead successor from the finger table: adopt the first entry
    /// (ascending, so the closest arc first) that is neither self nor the
    /// failed node and answers a probe. With no live candidate the node
    /// falls back to itself and waits to be notified.
    async fn replace_failed_successor(&self, failed: &NodeAddress) {
        let node = &self.node;

        let mut candidates: Vec<NodeAddress> = Vec::new();
        for i in 0..node.space().bits() {
            let finger = node.finger_successor(i);
            if finger != *node.address() && finger != *failed && !candidates.contains(&finger) {
                candidates.push(finger);
            }
        }

        for candidate in candidates {
            if node.rpc().node_info(&candidate.address).await.is_ok() {
                tracing::info!(old = %failed, new = %candidate, "replacing failed successor");
                node.set_successor(candidate.clone());
                if let Err(e) = node.rpc().notify(&candidate.address, node.address().clone()).await {
                    tracing::debug!(peer = %candidate, "notify failed: {}", e);
                }
                return;
            }
        }

        tracing::warn!(old = %failed, "no live finger to replace failed successor; reverting to self");
        node.set_successor(node.address().clone());
    }

    /// Re-resolve every finger's owner through the routing core. A failed
    /// lookup leaves that entry as it was.
    async fn fix_fingers(&self) {
        let node = &self.node;
        for i in 0..node.space().bits() {
            let start = node.finger_start(i);
            match node.find_successor(start, 0).await {
                Ok(owner) => node.set_finger(i, owner),
                Err(e) => {
                    tracing::debug!(finger = i, start, "fix_fingers lookup failed: {}", e);
                }
            }
        }
    }

    /// Probe the predecessor; clear it on any failure so notify can seat
    /// a live one.
    async fn check_predecessor(&self) {
        let node = &self.node;
        let Some(predecessor) = node.predecessor() else {
            return;
        };
        if predecessor == *node.address() {
            return;
        }
        if let Err(e) = node.rpc().node_info(&predecessor.address).await {
            tracing::warn!(peer = %predecessor, "predecessor unreachable ({}), clearing", e);
            node.clear_predecessor_if(&predecessor);
        }
    }
}
