use std::path::PathBuf;

use ledger::LedgerError;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("code {code} not found")]
    CodeNotFound { code: String },
    #[error("code {code} has already been used")]
    CodeAlreadyUsed { code: String },
    #[error("no spins left")]
    InsufficientBalance,
    #[error("invalid prize configuration: {0}")]
    InvalidConfiguration(#[from] SelectionError),
    #[error("admin secret is not configured")]
    ConfigurationMissing,
    #[error("access denied")]
    Unauthorized,
    #[error("ledger storage unavailable: {0}")]
    StorageUnavailable(#[from] LedgerError),
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("prize table is empty")]
    EmptyTable,
    #[error("total chance {total} must be positive and finite")]
    NonPositiveTotal { total: f64 },
}

#[derive(Debug, Error)]
pub enum PrizeTableError {
    #[error("failed to read prize table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse prize table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("prize table has no entries")]
    Empty,
    #[error("prize '{name}' has invalid chance {chance}")]
    InvalidChance { name: String, chance: f64 },
}
