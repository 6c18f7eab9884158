//! Month-bucketed occurrence series.
//!
//! Every series is laid over a [`MonthWindow`] taken from the whole dataset,
//! never from the filtered subset, so chart axes stay put while filters
//! change. Months without occurrences are filled with zero.

use crate::types::{ClaimRecord, ClaimTable, Eligibility, Month, MonthlyBucket};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub first: Month,
    pub last: Month,
}

impl MonthWindow {
    /// Window spanning the earliest to the latest occurrence in the table.
    /// `None` for an empty table.
    pub fn of(table: &ClaimTable) -> Option<Self> {
        let first = table.records().iter().map(|r| r.occurrence_date).min()?;
        let last = table.records().iter().map(|r| r.occurrence_date).max()?;
        Some(MonthWindow {
            first: Month::of(first),
            last: Month::of(last),
        })
    }

    pub fn months(&self) -> Vec<Month> {
        let mut out = Vec::new();
        let mut cur = Some(self.first);
        while let Some(m) = cur {
            if m > self.last {
                break;
            }
            out.push(m);
            cur = m.next();
        }
        out
    }
}

/// Filter selection driving the category series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesFilter {
    pub eligibility: Vec<Eligibility>,
    pub category: String,
}

impl SeriesFilter {
    pub fn matches(&self, record: &ClaimRecord) -> bool {
        record.category == self.category && self.eligibility.contains(&record.eligibility)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "buckets", rename_all = "snake_case")]
pub enum SeriesOutcome {
    /// Nothing was selected in the eligibility control.
    NoSelection,
    /// A full series over the window; may be all zeros.
    Series(Vec<MonthlyBucket>),
}

impl SeriesOutcome {
    pub fn buckets(&self) -> Option<&[MonthlyBucket]> {
        match self {
            SeriesOutcome::NoSelection => None,
            SeriesOutcome::Series(b) => Some(b),
        }
    }
}

/// Count `records` per month and left-join the counts onto `window`.
pub fn bucket_by_month<'a, I>(records: I, window: &MonthWindow) -> Vec<MonthlyBucket>
where
    I: IntoIterator<Item = &'a ClaimRecord>,
{
    let mut counts: HashMap<Month, usize> = HashMap::new();
    for r in records {
        *counts.entry(Month::of(r.occurrence_date)).or_default() += 1;
    }
    window
        .months()
        .into_iter()
        .map(|month| MonthlyBucket {
            month,
            count: counts.get(&month).copied().unwrap_or(0),
        })
        .collect()
}

/// Unfiltered occurrences per month.
pub fn monthly_occurrences(table: &ClaimTable) -> Vec<MonthlyBucket> {
    match MonthWindow::of(table) {
        Some(window) => bucket_by_month(table.records(), &window),
        None => Vec::new(),
    }
}

pub fn build_series(table: &ClaimTable, filter: &SeriesFilter) -> SeriesOutcome {
    if filter.eligibility.is_empty() {
        return SeriesOutcome::NoSelection;
    }
    let buckets = match MonthWindow::of(table) {
        Some(window) => bucket_by_month(table.records().iter().filter(|r| filter.matches(r)), &window),
        None => Vec::new(),
    };
    SeriesOutcome::Series(buckets)
}

/// Distinct categories in reverse first-appearance order; the first entry is
/// the default selection.
pub fn category_options(table: &ClaimTable) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<String> = table
        .records()
        .iter()
        .filter(|r| seen.insert(r.category.as_str()))
        .map(|r| r.category.clone())
        .collect();
    out.reverse();
    out
}

pub fn default_eligibility() -> Vec<Eligibility> {
    vec![Eligibility::Policyholder]
}
