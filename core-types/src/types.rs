// Copyright (c) James Kassemi, SC, US. All rights reserved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted ledger document.
///
/// Layout on disk:
/// `{ "users": { "guest": { "saldo": N } }, "spins": N, "codes": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub users: LedgerUsers,
    pub spins: u64,
    pub codes: Vec<RedemptionCode>,
}

impl Ledger {
    /// Spin credits available to the guest.
    pub fn balance(&self) -> u64 {
        self.users.guest.saldo
    }

    pub fn total_spins(&self) -> u64 {
        self.spins
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerUsers {
    pub guest: GuestRecord,
}

/// The single implicit identity tracked by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub saldo: u64,
    /// Fields written by other tools; carried through load/save untouched.
    /// Never holds a key that collides with a named field.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Keys serialized by [`GuestRecord`] itself.
const GUEST_RESERVED_KEYS: &[&str] = &["saldo"];

impl GuestRecord {
    pub fn with_balance(saldo: u64) -> Self {
        Self {
            saldo,
            extra: Map::new(),
        }
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Stores an extra field. Returns `false` and leaves the record unchanged
    /// when `key` is reserved.
    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if GUEST_RESERVED_KEYS.contains(&key.as_str()) {
            return false;
        }
        self.extra.insert(key, value);
        true
    }
}

/// One-time token exchangeable for spin credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionCode {
    pub code: String,
    pub amount: u64,
    pub used: bool,
}

impl RedemptionCode {
    pub fn unused(code: impl Into<String>, amount: u64) -> Self {
        Self {
            code: code.into(),
            amount,
            used: false,
        }
    }
}

/// Static prize configuration entry. `chance` is a relative weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeEntry {
    pub name: String,
    pub chance: f64,
    pub rarity: String,
    pub colors: [String; 2],
}

/// Canonical form used for code lookups and inserts.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_document() {
        let raw = r#"{
            "users": { "guest": { "saldo": 2, "nickname": "ana" } },
            "spins": 14,
            "codes": [
                { "code": "ABC123", "amount": 5, "used": false },
                { "code": "USED1", "amount": 1, "used": true }
            ]
        }"#;
        let ledger: Ledger = serde_json::from_str(raw).unwrap();
        assert_eq!(ledger.balance(), 2);
        assert_eq!(ledger.total_spins(), 14);
        assert_eq!(ledger.codes.len(), 2);
        assert!(ledger.codes[1].used);
        assert_eq!(ledger.users.guest.extra()["nickname"], "ana");

        let encoded = serde_json::to_value(&ledger).unwrap();
        assert_eq!(encoded["users"]["guest"]["nickname"], "ana");
        assert_eq!(encoded["users"]["guest"]["saldo"], 2);
    }

    #[test]
    fn extra_fields_cannot_shadow_balance() {
        let mut guest = GuestRecord::with_balance(1);
        assert!(!guest.set_extra("saldo", Value::from(9)));
        assert!(guest.set_extra("nickname", Value::from("ana")));

        let ledger = Ledger {
            users: LedgerUsers { guest },
            ..Ledger::default()
        };
        let encoded = serde_json::to_string(&ledger).unwrap();
        assert_eq!(encoded.matches("\"saldo\"").count(), 1);
        let decoded: Ledger = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ledger);
        assert_eq!(decoded.balance(), 1);
    }

    #[test]
    fn rejects_negative_balance() {
        let raw = r#"{ "users": { "guest": { "saldo": -1 } }, "spins": 0, "codes": [] }"#;
        assert!(serde_json::from_str::<Ledger>(raw).is_err());
    }

    #[test]
    fn prize_entry_requires_two_colors() {
        let ok = r##"{ "name": "Mug", "chance": 2.5, "rarity": "comum", "colors": ["#111", "#222"] }"##;
        let entry: PrizeEntry = serde_json::from_str(ok).unwrap();
        assert_eq!(entry.colors[1], "#222");

        let bad = r##"{ "name": "Mug", "chance": 2.5, "rarity": "comum", "colors": ["#111"] }"##;
        assert!(serde_json::from_str::<PrizeEntry>(bad).is_err());
    }

    #[test]
    fn normalize_code_trims_and_uppercases() {
        assert_eq!(normalize_code("  abc12 \n"), "ABC12");
        assert_eq!(normalize_code("   "), "");
    }
}
