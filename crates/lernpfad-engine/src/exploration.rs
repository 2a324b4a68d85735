//! Upper-confidence-bound style exploration bookkeeping.
//!
//! Under-sampled content kinds receive a bonus that shrinks both as the
//! session progresses (the β(t) decay) and as the kind accumulates
//! interactions (the √(ln N / (N_c + 1)) term).

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interaction counters backing the exploration bonus.
///
/// `total` starts at 1 so that `ln(total)` is defined from the first call;
/// per-kind counts start at 0 and the bonus denominator adds 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationCounters {
    pub total: u64,
    pub by_kind: BTreeMap<String, u64>,
}

impl Default for ExplorationCounters {
    fn default() -> Self {
        Self {
            total: 1,
            by_kind: BTreeMap::new(),
        }
    }
}

/// Maintains the counters and computes the time-decaying bonus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationTracker {
    beta0: f64,
    pub counters: ExplorationCounters,
}

impl ExplorationTracker {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            beta0: config.beta0,
            counters: ExplorationCounters::default(),
        }
    }

    /// Resume with previously persisted counters.
    #[must_use]
    pub fn with_counters(config: &EngineConfig, counters: ExplorationCounters) -> Self {
        Self {
            beta0: config.beta0,
            counters,
        }
    }

    /// Exploration strength at interaction index `t`: β₀ / (1 + ln(t + 1)).
    /// Non-increasing in `t`.
    #[must_use]
    pub fn beta(&self, t: u64) -> f64 {
        self.beta0 / (1.0 + ((t + 1) as f64).ln())
    }

    /// Bonus for a content kind at interaction index `t`:
    /// β(t) · √(ln(total) / (count + 1)).
    #[must_use]
    pub fn bonus(&self, content_kind: &str, t: u64) -> f64 {
        let count = self.counters.by_kind.get(content_kind).copied().unwrap_or(0);
        let total = self.counters.total.max(1) as f64;
        self.beta(t) * (total.ln() / (count + 1) as f64).sqrt()
    }

    /// Record that the learner was shown content of this kind. Called
    /// exactly once per completed recommendation cycle, never per candidate
    /// evaluated.
    pub fn record_selection(&mut self, content_kind: &str) {
        *self
            .counters
            .by_kind
            .entry(content_kind.to_string())
            .or_insert(0) += 1;
        self.counters.total += 1;
    }
}
