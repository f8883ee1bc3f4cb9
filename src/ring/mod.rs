//! Identifier Ring Module
//!
//! Modular arithmetic over the m-bit identifier space and the value types
//! shared by every other component.
//!
//! ## Core Concepts
//! - **Identifier space**: ids live in `[0, 2^m)`; keys are hashed into the
//!   same space, so key ownership reduces to arc membership.
//! - **Interval predicates**: `in_open` / `in_half_open_right` are the only
//!   two comparisons the routing and maintenance logic ever perform.
//! - **Addresses as values**: peers are `(id, address)` pairs, never owning
//!   handles; all interaction happens via RPC by address.

pub mod space;
pub mod types;

pub use space::{in_half_open_right, in_open, KeySpace};
pub use types::{FingerEntry, NodeAddress, NodeInfo};

#[cfg(test)]
mod tests;
