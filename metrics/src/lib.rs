// Copyright (c) James Kassemi, SC, US. All rights reserved.
//! Prometheus metrics for the wheel service.
use std::time::{SystemTime, UNIX_EPOCH};

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

pub use prometheus::Error as MetricsError;

pub struct WheelMetrics {
    registry: Registry,
    last_request_ts_ns: IntGauge,
    requests: IntCounterVec,
    spins: IntCounterVec,
    redemptions: IntCounterVec,
    admin_calls: IntCounterVec,
    credits_granted: IntCounter,
}

impl WheelMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new_custom(Some("wheel".to_string()), None)?;
        let last_request_ts_ns = IntGauge::new(
            "last_request_timestamp_ns",
            "Unix time of the most recent HTTP request, in nanoseconds",
        )?;
        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by route and status"),
            &["route", "status"],
        )?;
        let spins = IntCounterVec::new(
            Opts::new("spins_total", "Successful spins by rarity"),
            &["rarity"],
        )?;
        let redemptions = IntCounterVec::new(
            Opts::new("redemptions_total", "Redeem attempts by outcome"),
            &["outcome"],
        )?;
        let admin_calls = IntCounterVec::new(
            Opts::new("admin_calls_total", "Admin add-code calls by outcome"),
            &["outcome"],
        )?;
        let credits_granted = IntCounter::new(
            "credits_granted_total",
            "Spin credits granted through redeemed codes",
        )?;
        registry.register(Box::new(last_request_ts_ns.clone()))?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(spins.clone()))?;
        registry.register(Box::new(redemptions.clone()))?;
        registry.register(Box::new(admin_calls.clone()))?;
        registry.register(Box::new(credits_granted.clone()))?;
        Ok(Self {
            registry,
            last_request_ts_ns,
            requests,
            spins,
            redemptions,
            admin_calls,
            credits_granted,
        })
    }

    pub fn record_request(&self, route: &str, status: u16) {
        self.last_request_ts_ns.set(now_ns());
        self.requests
            .with_label_values(&[route, status.to_string().as_str()])
            .inc();
    }

    pub fn last_request_ts_ns(&self) -> Option<i64> {
        match self.last_request_ts_ns.get() {
            0 => None,
            ts => Some(ts),
        }
    }

    pub fn record_spin(&self, rarity: &str) {
        self.spins.with_label_values(&[rarity]).inc();
    }

    pub fn record_redemption(&self, outcome: &str, credits: u64) {
        self.redemptions.with_label_values(&[outcome]).inc();
        self.credits_granted.inc_by(credits);
    }

    pub fn record_admin_call(&self, outcome: &str) {
        self.admin_calls.with_label_values(&[outcome]).inc();
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<Vec<u8>, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}

fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}
