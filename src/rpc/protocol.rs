//! Wire protocol constants and transfer DTOs.
//!
//! Peer traffic is JSON over HTTP on the same port clients use; the paths
//! here are the complete inter-node surface.

use serde::{Deserialize, Serialize};

/// Topology snapshot, also the recursive-lookup entry point with
/// `?successor={id}`.
pub const ENDPOINT_NODE_INFO: &str = "/node-info";
/// Stabilize hint carrier.
pub const ENDPOINT_NOTIFY: &str = "/notify";
/// Forced successor update.
pub const ENDPOINT_UPDATE_SUCCESSOR: &str = "/update-successor";
/// Forced predecessor update.
pub const ENDPOINT_UPDATE_PREDECESSOR: &str = "/update-predecessor";
/// Bulk key hand-off.
pub const ENDPOINT_TRANSFER: &str = "/transfer";
/// Client-facing key-value path, also used for peer forwards.
pub const ENDPOINT_STORAGE: &str = "/storage";

/// One entry of a bulk key hand-off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}
