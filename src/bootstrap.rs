//! Bootstrap file support.
//!
//! `Nodes.json` is produced by an external ring-initialization tool: a
//! JSON array of node records carrying identity, pointers, and a
//! pre-computed finger table. A node started against the file loads its
//! own record; the identifier-space width is the finger-table length.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::ring::NodeAddress;

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapFinger {
    pub start: u64,
    #[serde(rename = "successorID")]
    pub successor: NodeAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapNode {
    pub id: u64,
    pub finger_table: Vec<BootstrapFinger>,
    #[serde(rename = "successorID")]
    pub successor: NodeAddress,
    #[serde(rename = "predecessorID")]
    pub predecessor: Option<NodeAddress>,
    pub address: String,
}

impl BootstrapNode {
    /// Identifier-space width implied by the record.
    pub fn space_bits(&self) -> u32 {
        self.finger_table.len() as u32
    }
}

/// Load the record for `node_id` from a bootstrap file. Any problem here
/// is fatal at startup.
pub fn load_node(path: &Path, node_id: u64) -> anyhow::Result<BootstrapNode> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read bootstrap file {}", path.display()))?;
    let nodes: Vec<BootstrapNode> = serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse bootstrap file {}", path.display()))?;
    nodes
        .into_iter()
        .find(|n| n.id == node_id)
        .with_context(|| format!("node {} not present in {}", node_id, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"[
            {
                "id": 0,
                "finger_table": [
                    {"start": 1, "successorID": {"id": 8, "address": "127.0.0.1:4001"}},
                    {"start": 2, "successorID": {"id": 8, "address": "127.0.0.1:4001"}},
                    {"start": 4, "successorID": {"id": 8, "address": "127.0.0.1:4001"}},
                    {"start": 8, "successorID": {"id": 8, "address": "127.0.0.1:4001"}}
                ],
                "successorID": {"id": 8, "address": "127.0.0.1:4001"},
                "predecessorID": {"id": 8, "address": "127.0.0.1:4001"},
                "address": "127.0.0.1:4000"
            },
            {
                "id": 8,
                "finger_table": [
                    {"start": 9, "successorID": {"id": 0, "address": "127.0.0.1:4000"}},
                    {"start": 10, "successorID": {"id": 0, "address": "127.0.0.1:4000"}},
                    {"start": 12, "successorID": {"id": 0, "address": "127.0.0.1:4000"}},
                    {"start": 0, "successorID": {"id": 0, "address": "127.0.0.1:4000"}}
                ],
                "successorID": {"id": 0, "address": "127.0.0.1:4000"},
                "predecessorID": null,
                "address": "127.0.0.1:4001"
            }
        ]"#
    }

    #[test]
    fn loads_matching_entry() {
        let dir = std::env::temp_dir().join("chord-dht-bootstrap-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Nodes.json");
        std::fs::write(&path, sample()).unwrap();

        let node = load_node(&path, 8).unwrap();
        assert_eq!(node.address, "127.0.0.1:4001");
        assert_eq!(node.space_bits(), 4);
        assert_eq!(node.successor.id, 0);
        assert!(node.predecessor.is_none());
        assert_eq!(node.finger_table[2].start, 12);
    }

    #[test]
    fn missing_entry_is_an_error() {
        let dir = std::env::temp_dir().join("chord-dht-bootstrap-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Nodes-missing.json");
        std::fs::write(&path, sample()).unwrap();

        assert!(load_node(&path, 5).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = std::env::temp_dir().join("chord-dht-bootstrap-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Nodes-bad.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(load_node(&path, 0).is_err());
    }
}
