//! Persisted page snapshot format.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use pagesmith_blocks::BlockInstance;
use serde::{Deserialize, Serialize};

use crate::storage::PersistenceResult;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A serialized page: the ordered block list plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// Schema version
    pub version: u32,

    /// Time of capture (Unix timestamp in ms)
    #[serde(default)]
    pub saved_at: u64,

    /// Blocks in page order
    pub blocks: Vec<BlockInstance>,
}

/// Reasons a stored blob can not be used as a snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot is not valid JSON: {0}")]
    Malformed(String),

    #[error("Snapshot schema version {0} is not supported")]
    UnsupportedVersion(u64),

    #[error("Snapshot has no schema version")]
    MissingVersion,

    #[error("Snapshot contains block {0} more than once")]
    DuplicateInstance(String),
}

impl PageSnapshot {
    /// Capture the given blocks at the current time.
    pub fn capture(blocks: &[BlockInstance]) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            blocks: blocks.to_vec(),
        }
    }

    /// Serialize to the stored byte form.
    pub fn encode(&self) -> PersistenceResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate a stored blob.
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or(SnapshotError::MissingVersion)?;

        if version != u64::from(SNAPSHOT_VERSION) {
            return Err(SnapshotError::UnsupportedVersion(version));
        }

        let snapshot: PageSnapshot =
            serde_json::from_value(value).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

        let mut seen = HashSet::new();
        for block in &snapshot.blocks {
            if !seen.insert(&block.instance_id) {
                return Err(SnapshotError::DuplicateInstance(block.instance_id.to_string()));
            }
        }

        Ok(snapshot)
    }
}
