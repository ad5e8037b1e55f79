// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Shared schemas and configuration for the prize wheel service.

pub mod config;
pub mod types;

pub use crate::config::{AppConfig, ConfigError};
pub use types::{GuestRecord, Ledger, LedgerUsers, PrizeEntry, RedemptionCode, normalize_code};
