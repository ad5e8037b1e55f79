// Copyright (c) James Kassemi, SC, US. All rights reserved.
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use chrono::Local;
use core_types::{GuestRecord, Ledger, PrizeEntry, RedemptionCode, normalize_code};
use ledger::LedgerStore;
use log::{info, warn};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::{
    error::{EngineError, EngineResult},
    prizes::PrizeTable,
    selection::select_weighted,
};

const SPIN_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Shared secret required by [`SpinEngine::admin_add_code`].
    pub admin_secret: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinOutcome {
    pub prize: PrizeEntry,
    pub prize_index: usize,
    pub spin_id: u64,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeemOutcome {
    pub amount: u64,
    pub balance: u64,
}

/// Draw source plus the single-writer guard for ledger mutations.
struct WriterState {
    rng: Pcg64,
}

/// Applies redeem/spin/admin operations to the ledger.
///
/// Every mutation runs load -> modify -> save while holding `writer`, so
/// concurrent requests in this process never interleave their cycles.
pub struct SpinEngine<S> {
    store: S,
    prizes: Arc<PrizeTable>,
    admin_secret: Option<String>,
    writer: Mutex<WriterState>,
}

impl<S: LedgerStore> SpinEngine<S> {
    pub fn new(store: S, prizes: Arc<PrizeTable>, config: EngineConfig) -> Self {
        let admin_secret = config
            .admin_secret
            .filter(|s| !s.trim().is_empty());
        Self {
            store,
            prizes,
            admin_secret,
            writer: Mutex::new(WriterState {
                rng: Pcg64::seed_from_u64(seed_or_clock(config.seed)),
            }),
        }
    }

    pub fn prizes(&self) -> &Arc<PrizeTable> {
        &self.prizes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_secret.is_some()
    }

    pub fn guest(&self) -> EngineResult<GuestRecord> {
        Ok(self.store.load()?.users.guest)
    }

    pub fn redeem(&self, code_input: &str) -> EngineResult<RedeemOutcome> {
        let code = normalize_code(code_input);
        if code.is_empty() {
            return Err(EngineError::InvalidInput("code must not be empty".to_string()));
        }

        let _writer = self.writer.lock();
        let mut ledger = self.store.load()?;

        let mut matches = ledger
            .codes
            .iter_mut()
            .filter(|entry| normalize_code(&entry.code) == code)
            .peekable();
        if matches.peek().is_none() {
            return Err(EngineError::CodeNotFound { code });
        }
        let Some(entry) = matches.find(|entry| !entry.used) else {
            return Err(EngineError::CodeAlreadyUsed { code });
        };

        let amount = entry.amount;
        let balance = ledger
            .users
            .guest
            .saldo
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidInput("balance would overflow".to_string()))?;
        entry.used = true;
        ledger.users.guest.saldo = balance;
        self.store.save(&ledger)?;

        info!("redeemed code {code} for {amount} spins (balance {balance})");
        Ok(RedeemOutcome { amount, balance })
    }

    pub fn spin(&self) -> EngineResult<SpinOutcome> {
        let mut writer = self.writer.lock();
        let mut ledger = self.store.load()?;
        if ledger.balance() == 0 {
            return Err(EngineError::InsufficientBalance);
        }

        let spin_id = ledger
            .spins
            .checked_add(1)
            .ok_or_else(|| EngineError::InvalidInput("spin counter would overflow".to_string()))?;

        let prize_index = select_weighted(self.prizes.entries(), &mut writer.rng)?;
        let time = Local::now().format(SPIN_TIME_FORMAT).to_string();
        let prize = self.prizes.entries()[prize_index].clone();

        ledger.users.guest.saldo -= 1;
        ledger.spins = spin_id;
        self.store.save(&ledger)?;

        info!(
            "spin #{} won '{}' ({}); balance {}",
            ledger.spins,
            prize.name,
            prize.rarity,
            ledger.balance()
        );
        Ok(SpinOutcome {
            prize,
            prize_index,
            spin_id,
            time,
        })
    }

    pub fn admin_add_code(&self, code: &str, amount: u64, supplied_secret: &str) -> EngineResult<()> {
        let Some(secret) = self.admin_secret.as_deref() else {
            warn!("admin add-code rejected: no admin secret configured");
            return Err(EngineError::ConfigurationMissing);
        };
        if supplied_secret != secret {
            warn!("admin add-code rejected: secret mismatch");
            return Err(EngineError::Unauthorized);
        }

        let code = normalize_code(code);
        if code.is_empty() {
            return Err(EngineError::InvalidInput("code must not be empty".to_string()));
        }
        if amount == 0 {
            return Err(EngineError::InvalidInput("amount must be positive".to_string()));
        }

        let _writer = self.writer.lock();
        let mut ledger: Ledger = self.store.load()?;
        ledger.codes.push(RedemptionCode::unused(code.clone(), amount));
        self.store.save(&ledger)?;

        info!("admin added code {code} worth {amount} spins");
        Ok(())
    }
}

fn seed_or_clock(seed: Option<u64>) -> u64 {
    if let Some(seed) = seed {
        return seed;
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let value = now.as_nanos() as u64;
    if value == 0 { 0x853c49e6748fea9b } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::LedgerUsers;
    use ledger::{LedgerError, MemoryLedgerStore};

    fn table() -> Arc<PrizeTable> {
        let entries = ["Chaveiro", "Camiseta", "Fone"]
            .iter()
            .map(|name| PrizeEntry {
                name: name.to_string(),
                chance: 1.0,
                rarity: "comum".to_string(),
                colors: ["#111".to_string(), "#222".to_string()],
            })
            .collect();
        Arc::new(PrizeTable::new(entries).unwrap())
    }

    fn ledger_with(balance: u64, codes: Vec<RedemptionCode>) -> Ledger {
        Ledger {
            users: LedgerUsers {
                guest: GuestRecord::with_balance(balance),
            },
            spins: 0,
            codes,
        }
    }

    fn engine(ledger: Ledger, secret: Option<&str>) -> SpinEngine<MemoryLedgerStore> {
        SpinEngine::new(
            MemoryLedgerStore::new(ledger),
            table(),
            EngineConfig {
                admin_secret: secret.map(str::to_string),
                seed: Some(5),
            },
        )
    }

    #[test]
    fn redeem_grants_once() {
        let engine = engine(ledger_with(0, vec![RedemptionCode::unused("PROMO5", 5)]), None);

        let outcome = engine.redeem(" promo5 ").unwrap();
        assert_eq!(outcome, RedeemOutcome { amount: 5, balance: 5 });
        let snapshot = engine.store().load().unwrap();
        assert_eq!(snapshot.balance(), 5);
        assert!(snapshot.codes[0].used);

        let err = engine.redeem("PROMO5").unwrap_err();
        assert!(matches!(err, EngineError::CodeAlreadyUsed { .. }));
        assert_eq!(engine.store().load().unwrap().balance(), 5);
    }

    #[test]
    fn redeem_unknown_code_leaves_ledger_alone() {
        let before = ledger_with(2, vec![RedemptionCode::unused("AAAA", 1)]);
        let engine = engine(before.clone(), None);
        let err = engine.redeem("ZZZZ").unwrap_err();
        assert!(matches!(err, EngineError::CodeNotFound { ref code } if code == "ZZZZ"));
        assert_eq!(engine.store().load().unwrap(), before);
    }

    #[test]
    fn redeem_rejects_blank_input() {
        let engine = engine(ledger_with(0, vec![]), None);
        assert!(matches!(engine.redeem("   "), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn duplicate_codes_redeem_independently() {
        let engine = engine(
            ledger_with(
                0,
                vec![RedemptionCode::unused("DUP", 2), RedemptionCode::unused("DUP", 3)],
            ),
            None,
        );
        assert_eq!(engine.redeem("dup").unwrap().balance, 2);
        assert_eq!(engine.redeem("dup").unwrap().balance, 5);
        assert!(matches!(engine.redeem("dup"), Err(EngineError::CodeAlreadyUsed { .. })));
    }

    #[test]
    fn spin_without_balance_is_refused() {
        let engine = engine(ledger_with(0, vec![]), None);
        assert!(matches!(engine.spin(), Err(EngineError::InsufficientBalance)));
        let snapshot = engine.store().load().unwrap();
        assert_eq!(snapshot.balance(), 0);
        assert_eq!(snapshot.total_spins(), 0);
    }

    #[test]
    fn spin_consumes_one_credit() {
        let mut ledger = ledger_with(3, vec![]);
        ledger.spins = 10;
        let engine = engine(ledger, None);

        let outcome = engine.spin().unwrap();
        let snapshot = engine.store().load().unwrap();
        assert_eq!(snapshot.balance(), 2);
        assert_eq!(snapshot.total_spins(), 11);
        assert_eq!(outcome.spin_id, 11);
        assert_eq!(engine.prizes().get(outcome.prize_index), Some(&outcome.prize));
        assert_eq!(outcome.time.len(), 8);
    }

    #[test]
    fn spin_counter_overflow_leaves_ledger_alone() {
        let mut before = ledger_with(1, vec![]);
        before.spins = u64::MAX;
        let engine = engine(before.clone(), None);

        assert!(matches!(engine.spin(), Err(EngineError::InvalidInput(_))));
        assert_eq!(engine.store().load().unwrap(), before);
    }

    #[test]
    fn zero_weight_table_is_configuration_error() {
        let entries = vec![PrizeEntry {
            name: "nothing".to_string(),
            chance: 0.0,
            rarity: "comum".to_string(),
            colors: ["#000".to_string(), "#000".to_string()],
        }];
        let engine = SpinEngine::new(
            MemoryLedgerStore::new(ledger_with(1, vec![])),
            Arc::new(PrizeTable::new(entries).unwrap()),
            EngineConfig::default(),
        );
        assert!(matches!(engine.spin(), Err(EngineError::InvalidConfiguration(_))));
        assert_eq!(engine.store().load().unwrap().balance(), 1);
    }

    #[test]
    fn admin_requires_configured_secret() {
        let engine = engine(ledger_with(0, vec![]), None);
        assert!(!engine.admin_enabled());
        assert!(matches!(
            engine.admin_add_code("NEW", 3, ""),
            Err(EngineError::ConfigurationMissing)
        ));

        let blank = engine_with_secret("  ");
        assert!(matches!(
            blank.admin_add_code("NEW", 3, "  "),
            Err(EngineError::ConfigurationMissing)
        ));
    }

    fn engine_with_secret(secret: &str) -> SpinEngine<MemoryLedgerStore> {
        engine(ledger_with(0, vec![]), Some(secret))
    }

    #[test]
    fn admin_wrong_secret_is_unauthorized() {
        let engine = engine_with_secret("s3cret");
        assert!(matches!(
            engine.admin_add_code("NEW", 3, "guess"),
            Err(EngineError::Unauthorized)
        ));
        assert!(engine.store().load().unwrap().codes.is_empty());
    }

    #[test]
    fn admin_secret_is_compared_exactly() {
        let engine = engine_with_secret("abc ");
        assert!(engine.admin_enabled());
        assert!(matches!(
            engine.admin_add_code("NEW", 3, "abc"),
            Err(EngineError::Unauthorized)
        ));
        assert!(matches!(
            engine.admin_add_code("NEW", 3, " abc "),
            Err(EngineError::Unauthorized)
        ));
        engine.admin_add_code("NEW", 3, "abc ").unwrap();
        assert_eq!(engine.store().load().unwrap().codes.len(), 1);
    }

    #[test]
    fn admin_added_codes_are_redeemable() {
        let engine = engine_with_secret("s3cret");
        engine.admin_add_code(" vip10 ", 10, "s3cret").unwrap();
        engine.admin_add_code("VIP10", 10, "s3cret").unwrap();

        let codes = engine.store().load().unwrap().codes;
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0], RedemptionCode::unused("VIP10", 10));

        assert_eq!(engine.redeem("vip10").unwrap().balance, 10);
        assert_eq!(engine.redeem("vip10").unwrap().balance, 20);
    }

    #[test]
    fn admin_rejects_empty_code_and_zero_amount() {
        let engine = engine_with_secret("s3cret");
        assert!(matches!(
            engine.admin_add_code(" ", 1, "s3cret"),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.admin_add_code("X", 0, "s3cret"),
            Err(EngineError::InvalidInput(_))
        ));
    }

    struct ReadOnlyStore(MemoryLedgerStore);

    impl LedgerStore for ReadOnlyStore {
        fn load(&self) -> ledger::Result<Ledger> {
            self.0.load()
        }

        fn save(&self, _ledger: &Ledger) -> ledger::Result<()> {
            Err(LedgerError::Io {
                path: "db.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn failed_save_is_reported() {
        let engine = SpinEngine::new(
            ReadOnlyStore(MemoryLedgerStore::new(ledger_with(
                1,
                vec![RedemptionCode::unused("A1", 1)],
            ))),
            table(),
            EngineConfig::default(),
        );
        assert!(matches!(engine.spin(), Err(EngineError::StorageUnavailable(_))));
        assert!(matches!(engine.redeem("A1"), Err(EngineError::StorageUnavailable(_))));
        assert_eq!(engine.store().0.load().unwrap().balance(), 1);
    }
}
