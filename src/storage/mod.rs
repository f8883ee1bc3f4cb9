//! Local Storage Module
//!
//! The in-memory key-value store a node serves for the arc of the ring it
//! owns, plus the HTTP handlers that expose it.
//!
//! ## Core Concepts
//! - **Write-once**: a key's value cannot be overwritten through the public
//!   API; a second PUT is a conflict.
//! - **Serialized mutation**: all store operations are serialized against
//!   each other behind one lock; reads may run concurrently.
//! - **Arc scans**: `scan_range` selects entries by hashed key over a
//!   half-open ring arc, which is what key hand-off between nodes is built
//!   from.

pub mod handlers;
pub mod store;

pub use store::{KeyStore, PutOutcome};

#[cfg(test)]
mod tests;
