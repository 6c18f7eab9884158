//! Group-by-and-count over the categorical fields of a claim.
//!
//! Counting goes through [`FrequencyTable`], which remembers the order in
//! which keys were first seen. Sorting by count is stable over that order,
//! so ties always come out the same way for the same input.

use crate::types::{ClaimRecord, CrossCount, GroupCount};
use clap::ValueEnum;
use std::collections::{BTreeMap, HashMap};

/// A categorical field a claim can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Dimension {
    Category,
    Eligibility,
    Sex,
    AgeBracket,
    Provider,
}

impl Dimension {
    pub fn value<'a>(&self, record: &'a ClaimRecord) -> &'a str {
        match self {
            Dimension::Category => &record.category,
            Dimension::Eligibility => record.eligibility.label(),
            Dimension::Sex => &record.sex,
            Dimension::AgeBracket => &record.age_bracket,
            Dimension::Provider => &record.provider_name,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Category => "categoria",
            Dimension::Eligibility => "elegibilidade_sinistro",
            Dimension::Sex => "sexo_colaborador_sinistro",
            Dimension::AgeBracket => "faixa_etaria_colaborador_sinistro",
            Dimension::Provider => "nome_prestador_sinistro",
        }
    }
}

/// Insertion-ordered counter.
#[derive(Debug, Default)]
pub struct FrequencyTable<'a> {
    index: HashMap<&'a str, usize>,
    entries: Vec<(&'a str, usize)>,
}

impl<'a> FrequencyTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &'a str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// The first key (in encounter order) holding the highest count.
    pub fn mode(&self) -> Option<&'a str> {
        let mut best: Option<(&'a str, usize)> = None;
        for &(key, count) in &self.entries {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        best.map(|(key, _)| key)
    }

    /// Counts, highest first; equal counts keep encounter order.
    pub fn into_sorted(self) -> Vec<GroupCount> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
            .into_iter()
            .map(|(key, count)| GroupCount {
                key: key.to_string(),
                count,
            })
            .collect()
    }
}

pub fn count_by<'a, I>(records: I, dim: Dimension) -> Vec<GroupCount>
where
    I: IntoIterator<Item = &'a ClaimRecord>,
{
    let mut freq = FrequencyTable::new();
    for r in records {
        freq.add(dim.value(r));
    }
    freq.into_sorted()
}

/// Keep the first `k` groups of a count-sorted result.
pub fn top_k(mut counts: Vec<GroupCount>, k: usize) -> Vec<GroupCount> {
    counts.truncate(k);
    counts
}

pub fn top_k_by<'a, I>(records: I, dim: Dimension, k: usize) -> Vec<GroupCount>
where
    I: IntoIterator<Item = &'a ClaimRecord>,
{
    top_k(count_by(records, dim), k)
}

/// Two-way group-by. Rows come out ordered by (primary, secondary).
pub fn cross_tab<'a, I>(records: I, primary: Dimension, secondary: Dimension) -> Vec<CrossCount>
where
    I: IntoIterator<Item = &'a ClaimRecord>,
{
    let mut map: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for r in records {
        *map.entry((primary.value(r), secondary.value(r))).or_default() += 1;
    }
    map.into_iter()
        .map(|((p, s), count)| CrossCount {
            primary: p.to_string(),
            secondary: s.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Eligibility;
    use chrono::NaiveDate;

    pub(crate) fn record(
        row_index: usize,
        claimant: &str,
        category: &str,
        eligibility: Eligibility,
        provider: &str,
    ) -> ClaimRecord {
        ClaimRecord {
            row_index,
            claimant_id: claimant.to_string(),
            category: category.to_string(),
            eligibility,
            sex: "M".to_string(),
            age_bracket: "19 a 23".to_string(),
            provider_name: provider.to_string(),
            paid_amount: 10.0,
            occurrence_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            cluster_id: None,
        }
    }

    #[test]
    fn test_scenario_top1_for_policyholders() {
        let records: Vec<ClaimRecord> = (0..10)
            .map(|i| {
                let elig = if i % 2 == 0 { Eligibility::Policyholder } else { Eligibility::Dependent };
                record(i, &i.to_string(), "Exame", elig, "Lab")
            })
            .collect();
        let top = top_k_by(
            records.iter().filter(|r| r.eligibility == Eligibility::Policyholder),
            Dimension::Category,
            1,
        );
        assert_eq!(
            top,
            vec![GroupCount {
                key: "Exame".to_string(),
                count: 5
            }]
        );
    }

    #[test]
    fn test_count_conservation() {
        let records = vec![
            record(0, "a", "Exame", Eligibility::Policyholder, "Lab"),
            record(1, "b", "Consulta", Eligibility::Dependent, "Hospital"),
            record(2, "c", "Exame", Eligibility::Dependent, "Lab"),
            record(3, "c", "Terapia", Eligibility::Dependent, "Clinica"),
        ];
        for dim in [Dimension::Category, Dimension::Eligibility, Dimension::Provider, Dimension::Sex] {
            let total: usize = count_by(&records, dim).iter().map(|g| g.count).sum();
            assert_eq!(total, records.len());
        }
        let total: usize = cross_tab(&records, Dimension::AgeBracket, Dimension::Sex)
            .iter()
            .map(|c| c.count)
            .sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let records = vec![
            record(0, "a", "Terapia", Eligibility::Policyholder, "Lab"),
            record(1, "b", "Exame", Eligibility::Policyholder, "Lab"),
            record(2, "c", "Consulta", Eligibility::Policyholder, "Lab"),
            record(3, "d", "Consulta", Eligibility::Policyholder, "Lab"),
        ];
        let first = top_k_by(&records, Dimension::Category, 2);
        assert_eq!(first[0].key, "Consulta");
        assert_eq!(first[1].key, "Terapia");
        for _ in 0..5 {
            assert_eq!(top_k_by(&records, Dimension::Category, 2), first);
        }
    }

    #[test]
    fn test_mode_first_encountered() {
        let mut freq = FrequencyTable::new();
        for k in ["b", "a", "a", "b", "c"] {
            freq.add(k);
        }
        assert_eq!(freq.mode(), Some("b"));
        assert_eq!(FrequencyTable::new().mode(), None);
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<ClaimRecord> = Vec::new();
        assert!(count_by(&records, Dimension::Category).is_empty());
        assert!(cross_tab(&records, Dimension::AgeBracket, Dimension::Sex).is_empty());
    }

    #[test]
    fn test_cross_tab_sorted() {
        let mut a = record(0, "a", "Exame", Eligibility::Policyholder, "Lab");
        a.age_bracket = "59 ou mais".to_string();
        let mut b = record(1, "b", "Exame", Eligibility::Policyholder, "Lab");
        b.sex = "F".to_string();
        let c = record(2, "c", "Exame", Eligibility::Policyholder, "Lab");
        let rows = cross_tab(&[a, b, c], Dimension::AgeBracket, Dimension::Sex);
        let keys: Vec<(&str, &str, usize)> = rows
            .iter()
            .map(|r| (r.primary.as_str(), r.secondary.as_str(), r.count))
            .collect();
        assert_eq!(keys, vec![("19 a 23", "F", 1), ("19 a 23", "M", 1), ("59 ou mais", "M", 1)]);
    }
}
