use core_types::Ledger;
use parking_lot::RwLock;

use crate::error::Result;

/// Whole-document persistence for the ledger.
///
/// There is no partial update: callers load, modify and save the full value.
/// Implementations do not serialize callers; the engine owns that boundary.
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> Result<Ledger>;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Process-local store, mainly for tests and embedding.
///
/// Holds the serialized JSON document so load/save go through the same
/// schema as [`crate::FileLedgerStore`].
#[derive(Debug)]
pub struct MemoryLedgerStore {
    document: RwLock<Vec<u8>>,
}

impl MemoryLedgerStore {
    pub fn new(ledger: Ledger) -> Self {
        let document = serde_json::to_vec(&ledger).expect("serialize ledger");
        Self {
            document: RwLock::new(document),
        }
    }

    /// Replaces the stored document with raw bytes, valid or not.
    pub fn set_document(&self, bytes: impl Into<Vec<u8>>) {
        *self.document.write() = bytes.into();
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new(Ledger::default())
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Ledger> {
        let ledger = serde_json::from_slice(&self.document.read())?;
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let document = serde_json::to_vec(ledger)?;
        *self.document.write() = document;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use core_types::{GuestRecord, RedemptionCode};

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryLedgerStore::default();
        let mut ledger = store.load().unwrap();
        assert_eq!(ledger, Ledger::default());

        ledger.users.guest = GuestRecord::with_balance(4);
        ledger.spins = 9;
        ledger.codes.push(RedemptionCode::unused("AB12", 3));
        store.save(&ledger).unwrap();

        assert_eq!(store.load().unwrap(), ledger);
        assert_eq!(store.load().unwrap().balance(), 4);
    }

    #[test]
    fn memory_store_rejects_malformed_document() {
        let store = MemoryLedgerStore::default();
        store.set_document(r#"{"users":{"guest":{"saldo":1,"saldo":9}},"spins":0,"codes":[]}"#);
        assert!(matches!(store.load(), Err(LedgerError::Malformed(_))));
        store.set_document("{ not json");
        assert!(matches!(store.load(), Err(LedgerError::Malformed(_))));
    }
}
