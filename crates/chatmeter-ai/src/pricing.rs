//! Model price table and cost arithmetic.
//!
//! Rates are USD per 1000 tokens. The table is assembled once when a session
//! is built (built-in rows plus overrides) and is read-only afterwards.

use std::collections::HashMap;

use chatmeter_common::ModelKind;
use chatmeter_config::PricingRow;

use crate::{ChatError, Model, TokenUsage};

/// Input and output rates for one model, USD per 1000 tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Rates {
    /// `input / 1000 * input_rate + output / 1000 * output_rate`, in that order.
    pub fn cost(&self, input_tokens: f64, output_tokens: f64) -> f64 {
        input_tokens / 1000.0 * self.input_per_1k + output_tokens / 1000.0 * self.output_per_1k
    }

    pub fn cost_of(&self, usage: &TokenUsage) -> f64 {
        self.cost(usage.input_tokens as f64, usage.output_tokens as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub model_name: String,
    pub kind: ModelKind,
    pub rates: Rates,
}

impl PriceRow {
    pub fn new(
        model_name: impl Into<String>,
        kind: ModelKind,
        input_per_1k: f64,
        output_per_1k: f64,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            kind,
            rates: Rates {
                input_per_1k,
                output_per_1k,
            },
        }
    }
}

impl From<&PricingRow> for PriceRow {
    fn from(row: &PricingRow) -> Self {
        Self::new(row.model.clone(), row.kind, row.input_per_1k, row.output_per_1k)
    }
}

/// Built-in rows: (model, kind, input per 1k, output per 1k).
const BUILTIN_PRICES: &[(&str, ModelKind, f64, f64)] = &[
    ("gpt-3.5-turbo", ModelKind::Text, 0.0015, 0.002),
    ("gpt-4", ModelKind::Text, 0.03, 0.06),
    ("text-embedding-ada-002", ModelKind::Embedding, 0.0001, 0.0),
];

#[derive(Debug, Clone)]
pub struct PriceTable {
    rows: HashMap<String, PriceRow>,
}

impl PriceTable {
    /// A table with no rows; every lookup fails.
    pub fn empty() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// The built-in OpenAI price list.
    pub fn builtin() -> Self {
        Self::empty().with_rows(
            BUILTIN_PRICES
                .iter()
                .map(|&(name, kind, input, output)| PriceRow::new(name, kind, input, output)),
        )
    }

    /// Add rows, replacing any existing row with the same model name.
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = PriceRow>) -> Self {
        for row in rows {
            self.rows.insert(row.model_name.clone(), row);
        }
        self
    }

    /// Built-in rows overlaid with `[[pricing]]` rows from the config file.
    pub fn from_config(overrides: &[PricingRow]) -> Self {
        Self::builtin().with_rows(overrides.iter().map(PriceRow::from))
    }

    pub fn price_for(&self, model: &Model) -> Result<Rates, ChatError> {
        self.rows
            .get(model.name())
            .filter(|row| row.kind == model.kind())
            .map(|row| row.rates)
            .ok_or_else(|| ChatError::UnknownModel {
                name: model.name().to_string(),
                kind: model.kind(),
            })
    }

    pub fn calculate_price(
        &self,
        model: &Model,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<f64, ChatError> {
        let rates = self.price_for(model)?;
        Ok(rates.cost(input_tokens as f64, output_tokens as f64))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Rough token count for price estimates: one token per character.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count()
}
