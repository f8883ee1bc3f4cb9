//! Membership lifecycle: join, voluntary leave, simulated crash and
//! recovery, and the key hand-off that keeps ownership aligned with the
//! ring as it changes shape.

use crate::error::NodeError;
use crate::ring::NodeAddress;
use crate::rpc::protocol::KeyValue;

use super::state::ChordNode;

/// A pending key hand-off: every stored entry whose id lies in `(lo, hi]`
/// belongs to `to` and should be pushed there.
///
/// Produced under the predecessor lock, executed afterwards so no lock is
/// held across the transfer RPC.
#[derive(Debug, Clone)]
pub struct Handoff {
    pub to: NodeAddress,
    pub lo: u64,
    pub hi: u64,
}

impl ChordNode {
    /// Join an existing ring through any live bootstrap peer.
    ///
    /// Only the local successor pointer is set; the predecessor stays
    /// absent and is repaired by the stabilize/notify cycle.
    pub async fn join(&self, nprime: &str) -> Result<(), NodeError> {
        let successor = self
            .rpc()
            .find_successor(nprime, self.address().id, 0)
            .await
            .map_err(|e| NodeError::unreachable(nprime, e))?;

        if successor == *self.address() {
            tracing::info!(peer = nprime, "ring already routes our id to us; staying put");
            return Ok(());
        }

        tracing::info!(successor = %successor, "joined ring via {}", nprime);
        self.set_predecessor(None);
        self.set_successor(successor.clone());
        self.remember(Some(successor));
        Ok(())
    }

    /// Voluntary departure: point the neighbors at each other, move every
    /// local key to the successor, reset to solo state, and signal
    /// shutdown. Structural updates are best-effort; a lost one is
    /// re-proposed by the neighbors' next stabilize.
    pub async fn leave(&self) -> Result<(), NodeError> {
        self.set_leaving();

        let predecessor = self.predecessor();
        let successor = self.successor();

        if let Some(predecessor) = predecessor {
            if let Err(e) = self
                .rpc()
                .update_successor(&predecessor.address, successor.clone())
                .await
            {
                tracing::warn!(peer = %predecessor, "update-successor on leave failed: {}", e);
            }
            if let Err(e) = self
                .rpc()
                .update_predecessor(&successor.address, predecessor.clone())
                .await
            {
                tracing::warn!(peer = %successor, "update-predecessor on leave failed: {}", e);
            }

            let entries: Vec<KeyValue> = self
                .store()
                .entries()
                .into_iter()
                .map(|(key, value)| KeyValue { key, value })
                .collect();
            if !entries.is_empty() {
                match self.rpc().transfer(&successor.address, entries.clone()).await {
                    Ok(()) => {
                        for entry in &entries {
                            self.store().delete(&entry.key);
                        }
                        tracing::info!(count = entries.len(), to = %successor, "keys handed off on leave");
                    }
                    Err(e) => {
                        tracing::warn!(to = %successor, "key transfer on leave failed: {}", e);
                    }
                }
            }
        }

        self.set_predecessor(None);
        self.set_successor(self.address().clone());
        for i in 0..self.space().bits() {
            self.set_finger(i, self.address().clone());
        }

        tracing::info!("left the ring, shutting down");
        self.trigger_shutdown();
        Ok(())
    }

    /// Enter the crashed state, remembering a neighbor for re-join.
    pub fn crash(&self) {
        let successor = self.successor();
        let neighbor = if successor != *self.address() {
            Some(successor)
        } else {
            self.predecessor()
        };
        self.remember(neighbor);
        self.set_crashed(true);
        tracing::info!("entering simulated crash");
    }

    /// Leave the crashed state and attempt a best-effort re-join through
    /// the remembered neighbor. Failing that, resume serving and let the
    /// maintenance loop converge.
    pub async fn recover(&self) {
        if !self.is_crashed() {
            return;
        }
        self.set_crashed(false);
        tracing::info!("recovering from simulated crash");

        if let Some(neighbor) = self.remembered() {
            if neighbor != *self.address() {
                if let Err(e) = self.join(&neighbor.address).await {
                    tracing::warn!(peer = %neighbor, "re-join after recovery failed: {}", e);
                }
            }
        }
    }

    /// A peer announced itself as our possible predecessor. Adopt it when
    /// we have none or it falls inside `(predecessor, self)`, and plan the
    /// hand-off of any entries that now belong to it.
    pub fn notify_received(&self, candidate: NodeAddress) -> Option<Handoff> {
        if candidate == *self.address() {
            return None;
        }

        let hi = candidate.id;
        let old = self.adopt_predecessor(candidate.clone())?;
        tracing::debug!(predecessor = %candidate, "adopted predecessor via notify");

        // With no prior predecessor the node held the whole ring; the arc
        // ending at the newcomer is everything outside (candidate, self].
        let lo = old.map(|p| p.id).unwrap_or(self.address().id);
        if lo == hi {
            return None;
        }
        Some(Handoff {
            to: candidate,
            lo,
            hi,
        })
    }

    /// Push the planned arc to its new owner, deleting the entries locally
    /// once the transfer went through. GET/PUT stay correct either way;
    /// a failed push only means a brief NotFound for moved keys.
    pub async fn run_handoff(&self, plan: Handoff) {
        let entries: Vec<KeyValue> = self
            .store()
            .scan_range(plan.lo, plan.hi)
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect();
        if entries.is_empty() {
            return;
        }

        match self.rpc().transfer(&plan.to.address, entries.clone()).await {
            Ok(()) => {
                for entry in &entries {
                    self.store().delete(&entry.key);
                }
                tracing::info!(count = entries.len(), to = %plan.to, "handed off keys to new predecessor");
            }
            Err(e) => {
                tracing::warn!(to = %plan.to, "key hand-off failed: {}", e);
            }
        }
    }
}
