use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use core_types::Ledger;
use log::{debug, info};

use crate::{
    config::LedgerConfig,
    error::{LedgerError, Result},
    store::LedgerStore,
};

#[derive(Clone, Debug)]
pub struct LedgerFileStats {
    pub path: PathBuf,
    pub created: bool,
    pub creation_duration: Option<Duration>,
    pub file_size: u64,
    pub code_count: usize,
}

/// JSON file backend. Every save rewrites the whole document.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    config: LedgerConfig,
}

impl FileLedgerStore {
    /// Opens the ledger at `config.path`, writing an empty document first when
    /// the file is missing and bootstrapping is enabled.
    pub fn bootstrap(config: LedgerConfig) -> Result<(Self, LedgerFileStats)> {
        let store = Self { config };
        let path = store.path().to_path_buf();
        let exists = path.exists();
        if !exists && !store.config.bootstrap_if_missing {
            return Err(LedgerError::Missing { path });
        }

        let (ledger, created, creation_duration) = if exists {
            (store.load()?, false, None)
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| LedgerError::io(parent, err))?;
            }
            let start = Instant::now();
            let ledger = Ledger::default();
            store.save(&ledger)?;
            info!("bootstrapped empty ledger at {}", path.display());
            (ledger, true, Some(start.elapsed()))
        };

        let file_size = fs::metadata(&path)
            .map_err(|err| LedgerError::io(&path, err))?
            .len();
        let stats = LedgerFileStats {
            path,
            created,
            creation_duration,
            file_size,
            code_count: ledger.codes.len(),
        };
        Ok((store, stats))
    }

    pub fn path(&self) -> &Path {
        self.config.path()
    }

    fn write_staged(&self, bytes: &[u8]) -> Result<()> {
        let staging = self.config.staging_path();
        let mut file = File::create(&staging).map_err(|err| LedgerError::io(&staging, err))?;
        file.write_all(bytes)
            .and_then(|_| file.sync_all())
            .map_err(|err| LedgerError::io(&staging, err))?;
        drop(file);
        fs::rename(&staging, self.path()).map_err(|err| {
            let _ = fs::remove_file(&staging);
            LedgerError::io(self.path(), err)
        })
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&self) -> Result<Ledger> {
        let path = self.path();
        let bytes = fs::read(path).map_err(|err| LedgerError::io(path, err))?;
        let ledger = serde_json::from_slice(&bytes)?;
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(ledger)?;
        self.write_staged(&bytes)?;
        debug!(
            "persisted ledger to {} ({} bytes)",
            self.path().display(),
            bytes.len()
        );
        Ok(())
    }
}
