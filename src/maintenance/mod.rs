//! Ring Maintenance Module
//!
//! The periodic repair cycle that keeps the ring converging under churn:
//! `stabilize` (with its notify), `fix_fingers`, and `check_predecessor`,
//! in that order on every tick.
//!
//! Every sub-step tolerates RPC failure: a failed call leaves state
//! untouched, except that an unreachable predecessor is cleared and an
//! unreachable successor is replaced from the finger table. The loop is
//! the system's only retry mechanism; request handlers never retry.

pub mod service;

pub use service::Maintainer;
