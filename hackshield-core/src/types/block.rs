//! Ledger blocks and the local snapshot.
//!
//! Blocks are issued by the remote service and never mutated here. The hash is
//! an opaque token: it is displayed, never recomputed or validated.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::HASH_PREVIEW_LEN;

/// One ledger entry as listed by the Block Service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Opaque content identifier assigned by the service
    pub hash: String,
    /// Identity that submitted the block
    #[serde(default)]
    pub device_id: String,
    /// Intended recipient
    #[serde(default)]
    pub recipient: String,
    /// ISO-8601 instant, exactly as the service sent it
    #[serde(default)]
    pub timestamp: String,
}

impl Block {
    /// Parses the timestamp.
    ///
    /// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` read as UTC.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Date portion of the timestamp (text before `T`), if any.
    pub fn date(&self) -> Option<&str> {
        self.timestamp
            .split('T')
            .next()
            .filter(|date| !date.is_empty())
    }

    /// Leading characters of the hash followed by an ellipsis.
    pub fn hash_preview(&self) -> String {
        let cut = self
            .hash
            .char_indices()
            .nth(HASH_PREVIEW_LEN)
            .map(|(idx, _)| idx)
            .unwrap_or(self.hash.len());
        format!("{}...", &self.hash[..cut])
    }
}

/// Local copy of the ledger, in service order.
///
/// Replaced wholesale on every successful fetch; never merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockLedgerSnapshot {
    blocks: Vec<Block>,
}

impl BlockLedgerSnapshot {
    /// Wraps a freshly fetched ledger.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Blocks in service order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Display number for the block at `index`: `len - index`.
    ///
    /// The service lists newest first, so the head gets the highest number.
    pub fn display_number(&self, index: usize) -> Option<usize> {
        (index < self.blocks.len()).then(|| self.blocks.len() - index)
    }

    /// Iterates `(display_number, block)` pairs in service order.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Block)> + '_ {
        let total = self.blocks.len();
        self.blocks
            .iter()
            .enumerate()
            .map(move |(idx, block)| (total - idx, block))
    }
}

impl From<Vec<Block>> for BlockLedgerSnapshot {
    fn from(blocks: Vec<Block>) -> Self {
        Self::new(blocks)
    }
}
