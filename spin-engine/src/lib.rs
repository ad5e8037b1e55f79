//! Prize wheel engine.
//!
//! The crate exposes:
//! - [`SpinEngine`]: redeem/spin/admin operations over a [`ledger::LedgerStore`].
//! - [`PrizeTable`]: the read-only weighted prize configuration.
//! - [`selection`]: the weighted sampling primitives.

pub mod engine;
pub mod error;
pub mod prizes;
pub mod selection;

pub use engine::{EngineConfig, RedeemOutcome, SpinEngine, SpinOutcome};
pub use error::{EngineError, EngineResult, PrizeTableError, SelectionError};
pub use prizes::PrizeTable;
