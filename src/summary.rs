use crate::aggregate::FrequencyTable;
use crate::error::{DashboardError, Result};
use crate::types::ClaimTable;
use crate::util::round2;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Headline facts about the whole dataset.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_claims: usize,
    pub distinct_claimants: usize,
    /// Undefined when the dataset has no claimants.
    #[serde(serialize_with = "metric")]
    pub claims_per_claimant: Result<f64>,
    pub max_paid: Option<f64>,
    pub top_provider: Option<String>,
}

fn metric<S: Serializer>(value: &Result<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Ok(v) => serializer.serialize_some(v),
        Err(_) => serializer.serialize_none(),
    }
}

pub fn distinct_claimants(table: &ClaimTable) -> usize {
    table
        .records()
        .iter()
        .map(|r| r.claimant_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

pub fn claims_per_claimant(table: &ClaimTable) -> Result<f64> {
    let claimants = distinct_claimants(table);
    if claimants == 0 {
        return Err(DashboardError::DivisionByZero("claims per claimant"));
    }
    Ok(round2(table.len() as f64 / claimants as f64))
}

pub fn max_paid(table: &ClaimTable) -> Option<f64> {
    table
        .records()
        .iter()
        .map(|r| r.paid_amount)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        .map(round2)
}

/// Most frequent provider. Ties go to the provider seen first in the file.
pub fn top_provider(table: &ClaimTable) -> Option<String> {
    let mut freq = FrequencyTable::new();
    for r in table.records() {
        freq.add(&r.provider_name);
    }
    freq.mode().map(str::to_string)
}

pub fn summarize(table: &ClaimTable) -> SummaryStats {
    SummaryStats {
        total_claims: table.len(),
        distinct_claimants: distinct_claimants(table),
        claims_per_claimant: claims_per_claimant(table),
        max_paid: max_paid(table),
        top_provider: top_provider(table),
    }
}
