//! Spend and token accounting for one session.

use std::collections::HashMap;

use crate::TokenUsage;

/// Usage attributed to a single model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelUsage {
    pub usage: TokenUsage,
    /// USD spent on this model.
    pub cost: f64,
    pub calls: u64,
}

/// Tracks cumulative spend, per-model usage and cache savings.
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    /// Total usage across all models.
    total: TokenUsage,
    /// Total USD spent on upstream calls.
    total_cost: f64,
    /// Usage broken down by model name.
    by_model: HashMap<String, ModelUsage>,
    /// Number of upstream API calls made.
    call_count: u64,
    /// Calls answered from the response cache.
    cache_hits: u64,
    /// USD the cache hits would have cost.
    saved_cost: f64,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an upstream call and what it cost.
    pub fn record(&mut self, model: &str, usage: &TokenUsage, cost: f64) {
        self.total.input_tokens += usage.input_tokens;
        self.total.output_tokens += usage.output_tokens;
        self.total_cost += cost;
        self.call_count += 1;

        let entry = self.by_model.entry(model.to_string()).or_default();
        entry.usage.input_tokens += usage.input_tokens;
        entry.usage.output_tokens += usage.output_tokens;
        entry.cost += cost;
        entry.calls += 1;
    }

    /// Record a call served from cache that would otherwise have cost `cost`.
    pub fn record_cache_hit(&mut self, cost: f64) {
        self.cache_hits += 1;
        self.saved_cost += cost;
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn for_model(&self, model: &str) -> Option<&ModelUsage> {
        self.by_model.get(model)
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    pub fn saved_cost(&self) -> f64 {
        self.saved_cost
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
