//! Price overrides.

use chatmeter_common::ModelKind;
use serde::{Deserialize, Serialize};

/// One `[[pricing]]` row. Rates are USD per 1000 tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingRow {
    pub model: String,
    #[serde(default)]
    pub kind: ModelKind,
    pub input_per_1k: f64,
    #[serde(default)]
    pub output_per_1k: f64,
}
