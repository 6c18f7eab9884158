use crate::aggregate::{top_k_by, Dimension};
use crate::config::ProfileConfig;
use crate::types::{ClaimRecord, ClaimTable, ProfileSummary};
use crate::util::mean_paid;
use log::{debug, info};
use std::collections::HashSet;

pub const TOP_PER_PROFILE: usize = 3;

/// Compare the configured profiles side by side, in configuration order.
///
/// Only rows whose cluster is configured take part. Claimants are counted
/// once across all profiles, in the profile of their earliest row. A
/// configured cluster with no rows gets zero-valued aggregates.
pub fn compare_profiles(table: &ClaimTable, config: &ProfileConfig) -> Vec<ProfileSummary> {
    let wanted = config.cluster_ids();
    let mut selected: Vec<&ClaimRecord> = table
        .records()
        .iter()
        .filter(|r| r.cluster_id.map_or(false, |c| wanted.contains(&c)))
        .collect();
    selected.sort_by_key(|r| r.row_index);
    info!("{} of {} claims fall in a configured profile", selected.len(), table.len());

    let mut seen = HashSet::new();
    let first_rows: Vec<&ClaimRecord> = selected
        .iter()
        .copied()
        .filter(|r| seen.insert(r.claimant_id.as_str()))
        .collect();

    config
        .profiles
        .iter()
        .map(|profile| {
            let rows: Vec<&ClaimRecord> = selected
                .iter()
                .copied()
                .filter(|r| r.cluster_id == Some(profile.cluster_id))
                .collect();
            if rows.is_empty() {
                debug!("profile {} (cluster {}) has no claims", profile.rank, profile.cluster_id);
            }
            ProfileSummary {
                rank: profile.rank.clone(),
                cluster_id: profile.cluster_id,
                description: profile.description.clone(),
                claims: rows.len(),
                claimants: first_rows
                    .iter()
                    .filter(|r| r.cluster_id == Some(profile.cluster_id))
                    .count(),
                top_categories: top_k_by(rows.iter().copied(), Dimension::Category, TOP_PER_PROFILE),
                top_providers: top_k_by(rows.iter().copied(), Dimension::Provider, TOP_PER_PROFILE),
                mean_paid: mean_paid(rows.iter().map(|r| &r.paid_amount)),
            }
        })
        .collect()
}
