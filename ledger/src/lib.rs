//! Persistence for the prize wheel ledger.
//!
//! The crate exposes:
//! - [`LedgerStore`]: whole-document load/save contract.
//! - [`FileLedgerStore`]: JSON file backend with staged rewrites.
//! - [`MemoryLedgerStore`]: process-local backend.

pub mod config;
pub mod error;
mod storage;
pub mod store;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use storage::{FileLedgerStore, LedgerFileStats};
pub use store::{LedgerStore, MemoryLedgerStore};
