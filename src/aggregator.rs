//! Usage aggregates over the unified relation.
//!
//! Null handling follows SQL aggregate rules:
//! - a token total stays `None` while no row has a value for it;
//! - the grand total coalesces each row's counters to zero before summing;
//! - cost coalesces every counter to zero, so rows without usage cost nothing.

use crate::error::{Result, StatsError};
use crate::models::{project_name, ProjectCost, TokenTotals, UsageRecord};
use crate::pricing::PricingTable;
use crate::relation::Relation;
use std::collections::HashMap;
use tracing::debug;

const TOKEN_TOTALS_STEP: &str = "token totals";
const GLOBAL_COST_STEP: &str = "global cost";
const COST_BY_PROJECT_STEP: &str = "cost by project";

pub struct UsageAggregator<'a> {
    relation: &'a Relation,
    pricing: &'a PricingTable,
}

impl<'a> UsageAggregator<'a> {
    pub fn new(relation: &'a Relation, pricing: &'a PricingTable) -> Self {
        Self { relation, pricing }
    }

    fn usage_records(
        &self,
        step: &'static str,
    ) -> impl Iterator<Item = Result<UsageRecord>> + 'a {
        let relation = self.relation;
        relation.records().map(move |record| {
            UsageRecord::from_record(&record).map_err(|message| {
                StatsError::query(step, format!("{} ({})", message, record.source().display()))
            })
        })
    }

    pub fn global_token_totals(&self) -> Result<TokenTotals> {
        let mut totals = TokenTotals::default();

        for usage in self.usage_records(TOKEN_TOTALS_STEP) {
            let tokens = usage?.tokens;
            accumulate(&mut totals.input, tokens.input);
            accumulate(&mut totals.output, tokens.output);
            accumulate(&mut totals.cache_read, tokens.cache_read);
            accumulate(&mut totals.cache_creation, tokens.cache_creation);
            accumulate(&mut totals.grand_total, Some(tokens.coalesced_total()));
        }

        debug!(?totals, "Computed global token totals");
        Ok(totals)
    }

    pub fn global_cost(&self) -> Result<f64> {
        let mut total = 0.0;
        for usage in self.usage_records(GLOBAL_COST_STEP) {
            let usage = usage?;
            total += self.pricing.cost(usage.model.as_deref(), &usage.tokens);
        }

        debug!(total_cost = total, "Computed global cost");
        Ok(total)
    }

    /// Cost per `cwd`, highest first, at most `limit` entries.
    ///
    /// Rows without a `cwd` are left out. The sort is stable, so equal costs keep
    /// the order in which their `cwd` first appeared.
    pub fn cost_by_project(&self, limit: usize) -> Result<Vec<ProjectCost>> {
        let mut projects: Vec<ProjectCost> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for usage in self.usage_records(COST_BY_PROJECT_STEP) {
            let usage = usage?;
            let Some(cwd) = usage.cwd else {
                continue;
            };
            let cost = self.pricing.cost(usage.model.as_deref(), &usage.tokens);

            match positions.get(&cwd) {
                Some(&position) => projects[position].cost += cost,
                None => {
                    positions.insert(cwd.clone(), projects.len());
                    projects.push(ProjectCost {
                        project_name: project_name(&cwd),
                        cwd,
                        cost,
                    });
                }
            }
        }

        projects.sort_by(|a, b| b.cost.total_cmp(&a.cost));
        projects.truncate(limit);

        debug!(projects = projects.len(), limit, "Computed cost by project");
        Ok(projects)
    }
}

fn accumulate(total: &mut Option<i64>, value: Option<i64>) {
    if let Some(value) = value {
        *total = Some(total.unwrap_or(0).saturating_add(value));
    }
}
