//! # HackShield Ledger
//!
//! Keeps a local, periodically refreshed copy of the remote block ledger.
//!
//! ## Features
//!
//! - **Timer polling**: one fetch on [`BlockLedgerPoller::start`], then one per interval
//! - **Manual refresh**: [`BlockLedgerPoller::refresh_now`] outside the timer cadence
//! - **Ordered apply**: every fetch is sequence-numbered and a response older
//!   than the last applied one is dropped, so the snapshot is never stale or torn
//! - **Display rows**: [`BlockCard`] numbers blocks newest-first
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hackshield_ledger::BlockLedgerPoller;
//!
//! let poller = BlockLedgerPoller::new(service);
//! let mut view = poller.subscribe();
//! poller.start();
//!
//! while view.changed().await.is_ok() {
//!     for card in view.borrow().cards() {
//!         println!("{} {}", card.title(), card.hash_preview);
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod poller;
mod view;

pub use poller::{BlockLedgerPoller, FetchOutcome};
pub use view::{BlockCard, LedgerView};
