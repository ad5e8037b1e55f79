use std::path::{Path, PathBuf};

pub const DEFAULT_LEDGER_PATH: &str = "db.json";

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub path: PathBuf,
    /// Write an empty ledger when the file does not exist yet.
    pub bootstrap_if_missing: bool,
}

impl LedgerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bootstrap_if_missing: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used to stage a full rewrite before it replaces the ledger.
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_LEDGER_PATH.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_PATH)
    }
}
