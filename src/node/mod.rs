//! Chord Node Module
//!
//! The state of one ring participant and everything that operates on it:
//! the routing core (`find_successor` / `closest_preceding_node`), the
//! client request path (local-serve vs forward), and the membership
//! lifecycle (join, voluntary leave, simulated crash and recovery).
//!
//! ## Core Concepts
//! - **One explicit value**: the node is an `Arc<ChordNode>` threaded
//!   through handlers and the maintenance loop, never a process global.
//! - **Copy-out before RPC**: successor, predecessor, and finger pointers
//!   are read under short-lived locks; no lock is ever held across an
//!   outbound call.
//! - **Peers as values**: every pointer is an `(id, address)` pair; the
//!   only way to interact with a peer is an RPC by address.

pub mod handlers;
pub mod lifecycle;
pub mod routing;
pub mod state;

pub use lifecycle::Handoff;
pub use state::ChordNode;
