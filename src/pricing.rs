//! Static per-model pricing.
//!
//! Rates are USD per million tokens. Rules are matched by model-name prefix in
//! order, first match wins; anything unmatched, including a missing model, uses
//! the default tier.

use crate::models::UsageTokens;
use serde::Serialize;

const TOKENS_PER_RATE_UNIT: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingTier {
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingRule {
    pub prefix: &'static str,
    pub tier: PricingTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingTable {
    rules: &'static [PricingRule],
    default_tier: PricingTier,
}

pub const OPUS_TIER: PricingTier = PricingTier {
    input: 15.0,
    output: 75.0,
    cache_write: 18.75,
    cache_read: 1.50,
};

pub const HAIKU_TIER: PricingTier = PricingTier {
    input: 0.80,
    output: 4.0,
    cache_write: 1.00,
    cache_read: 0.08,
};

pub const DEFAULT_TIER: PricingTier = PricingTier {
    input: 3.0,
    output: 15.0,
    cache_write: 3.75,
    cache_read: 0.30,
};

static STANDARD_RULES: [PricingRule; 2] = [
    PricingRule {
        prefix: "claude-opus",
        tier: OPUS_TIER,
    },
    PricingRule {
        prefix: "claude-haiku",
        tier: HAIKU_TIER,
    },
];

static STANDARD_TABLE: PricingTable = PricingTable {
    rules: &STANDARD_RULES,
    default_tier: DEFAULT_TIER,
};

impl PricingTable {
    /// The built-in table shared by the whole process.
    pub fn standard() -> &'static PricingTable {
        &STANDARD_TABLE
    }

    pub fn rules(&self) -> &[PricingRule] {
        self.rules
    }

    pub fn tier_for(&self, model: Option<&str>) -> &PricingTier {
        model
            .and_then(|model| {
                self.rules
                    .iter()
                    .find(|rule| model.starts_with(rule.prefix))
            })
            .map(|rule| &rule.tier)
            .unwrap_or(&self.default_tier)
    }

    /// Cost in USD of one row; missing counters count as zero.
    pub fn cost(&self, model: Option<&str>, tokens: &UsageTokens) -> f64 {
        let tier = self.tier_for(model);
        let weighted = tokens.input.unwrap_or(0) as f64 * tier.input
            + tokens.output.unwrap_or(0) as f64 * tier.output
            + tokens.cache_creation.unwrap_or(0) as f64 * tier.cache_write
            + tokens.cache_read.unwrap_or(0) as f64 * tier.cache_read;
        weighted / TOKENS_PER_RATE_UNIT
    }
}
