use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use core_types::PrizeEntry;
use log::info;

use crate::error::PrizeTableError;

/// Ordered, read-only prize configuration shared across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct PrizeTable {
    entries: Vec<PrizeEntry>,
}

impl PrizeTable {
    pub fn new(entries: Vec<PrizeEntry>) -> Result<Self, PrizeTableError> {
        if entries.is_empty() {
            return Err(PrizeTableError::Empty);
        }
        if let Some(bad) = entries
            .iter()
            .find(|p| !p.chance.is_finite() || p.chance < 0.0)
        {
            return Err(PrizeTableError::InvalidChance {
                name: bad.name.clone(),
                chance: bad.chance,
            });
        }
        Ok(Self { entries })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, PrizeTableError> {
        let entries: Vec<PrizeEntry> = serde_json::from_slice(bytes)?;
        Self::new(entries)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Self>, PrizeTableError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| PrizeTableError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        let table = Self::from_json(&bytes)?;
        info!(
            "loaded {} prizes from {} (total chance {})",
            table.len(),
            path.display(),
            table.entries.iter().map(|p| p.chance).sum::<f64>()
        );
        Ok(Arc::new(table))
    }

    pub fn entries(&self) -> &[PrizeEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&PrizeEntry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
