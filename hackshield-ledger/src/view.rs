//! Consumer-facing ledger state and display rows.

use serde::Serialize;

use hackshield_core::types::{Block, BlockLedgerSnapshot};

/// Placeholder shown when a block carries no date.
const NO_DATE: &str = "—";

/// What a ledger screen renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerView {
    /// Last successfully fetched ledger
    pub snapshot: BlockLedgerSnapshot,
    /// True until the first fetch resolves
    pub loading: bool,
    /// True while a manual refresh is in flight
    pub refreshing: bool,
    /// Message of the most recent failed fetch, cleared by the next success
    pub last_error: Option<String>,
    /// Sequence number of the fetch the snapshot came from (0 = none yet)
    pub last_applied_sequence: u64,
}

impl Default for LedgerView {
    fn default() -> Self {
        Self {
            snapshot: BlockLedgerSnapshot::default(),
            loading: true,
            refreshing: false,
            last_error: None,
            last_applied_sequence: 0,
        }
    }
}

impl LedgerView {
    /// Display rows for the current snapshot.
    pub fn cards(&self) -> Vec<BlockCard> {
        BlockCard::from_snapshot(&self.snapshot)
    }
}

/// One rendered ledger row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockCard {
    /// Display number, `N - i` for index `i` of `N` blocks
    pub number: usize,
    /// Shortened hash
    pub hash_preview: String,
    /// Submitting identity
    pub device_id: String,
    /// Intended recipient
    pub recipient: String,
    /// Date part of the timestamp
    pub date: String,
}

impl BlockCard {
    fn new(number: usize, block: &Block) -> Self {
        Self {
            number,
            hash_preview: block.hash_preview(),
            device_id: block.device_id.clone(),
            recipient: block.recipient.clone(),
            date: block.date().unwrap_or(NO_DATE).to_string(),
        }
    }

    /// Rows for every block, in snapshot order.
    pub fn from_snapshot(snapshot: &BlockLedgerSnapshot) -> Vec<Self> {
        snapshot
            .numbered()
            .map(|(number, block)| Self::new(number, block))
            .collect()
    }

    /// Row heading, e.g. `Block #3`.
    pub fn title(&self) -> String {
        format!("Block #{}", self.number)
    }
}
