//! One render pass: pick the view, run the components it needs, hand back
//! plain tables for the presentation layer.
//!
//! Nothing here holds state between passes. The caller owns the current
//! [`View`] and [`Selection`] and passes them in every time.

use crate::aggregate::{count_by, cross_tab, top_k_by, Dimension};
use crate::config::ProfileConfig;
use crate::error::{DashboardError, Result};
use crate::profiles::compare_profiles;
use crate::series::{build_series, category_options, default_eligibility, monthly_occurrences, SeriesFilter, SeriesOutcome};
use crate::summary::{summarize, SummaryStats};
use crate::types::{ClaimTable, CrossCount, Eligibility, GroupCount, MonthlyBucket, ProfileSummary};
use log::info;
use serde::Serialize;

pub const TOP_PER_ELIGIBILITY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// "Veja nossas análises"
    ViewAnalyses,
    /// "Voltar para home"
    ReturnHome,
}

impl View {
    pub fn apply(self, action: Action) -> View {
        match action {
            Action::ViewAnalyses => View::Analysis,
            Action::ReturnHome => View::Home,
        }
    }
}

/// State of the home view's filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub eligibility: Option<Vec<Eligibility>>,
    /// `None` picks the first category option.
    pub category: Option<String>,
}

impl Selection {
    pub fn eligibility(&self) -> Vec<Eligibility> {
        self.eligibility.clone().unwrap_or_else(default_eligibility)
    }
}

#[derive(Debug, Serialize)]
pub struct TopByEligibility {
    pub eligibility: Eligibility,
    pub categories: Vec<GroupCount>,
    pub providers: Vec<GroupCount>,
}

#[derive(Debug, Serialize)]
pub struct CategorySeries {
    pub eligibility: Vec<Eligibility>,
    pub category: Option<String>,
    pub outcome: SeriesOutcome,
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub summary: SummaryStats,
    pub sex: Vec<GroupCount>,
    pub eligibility: Vec<GroupCount>,
    pub age_by_sex: Vec<CrossCount>,
    pub monthly: Vec<MonthlyBucket>,
    pub top_by_eligibility: Vec<TopByEligibility>,
    pub category_options: Vec<String>,
    pub category_series: CategorySeries,
}

#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Rendered {
    Home(HomeView),
    Analysis(AnalysisView),
}

pub fn sex_label(code: &str) -> &str {
    match code {
        "M" => "Masculino",
        "F" => "Feminino",
        other => other,
    }
}

pub fn render(view: View, table: &ClaimTable, selection: &Selection, profiles: &ProfileConfig) -> Result<Rendered> {
    info!("rendering {:?} view over {} claims", view, table.len());
    match view {
        View::Home => Ok(Rendered::Home(render_home(table, selection))),
        View::Analysis => render_analysis(table, profiles).map(Rendered::Analysis),
    }
}

pub fn render_home(table: &ClaimTable, selection: &Selection) -> HomeView {
    let records = table.records();

    let sex = count_by(records, Dimension::Sex)
        .into_iter()
        .map(|g| GroupCount {
            key: sex_label(&g.key).to_string(),
            count: g.count,
        })
        .collect();

    let mut age_by_sex = cross_tab(records, Dimension::AgeBracket, Dimension::Sex);
    for row in &mut age_by_sex {
        row.secondary = sex_label(&row.secondary).to_string();
    }

    let top_by_eligibility = Eligibility::ALL
        .iter()
        .map(|&elig| {
            let subset = move || records.iter().filter(move |r| r.eligibility == elig);
            TopByEligibility {
                eligibility: elig,
                categories: top_k_by(subset(), Dimension::Category, TOP_PER_ELIGIBILITY),
                providers: top_k_by(subset(), Dimension::Provider, TOP_PER_ELIGIBILITY),
            }
        })
        .collect();

    let options = category_options(table);
    HomeView {
        summary: summarize(table),
        sex,
        eligibility: count_by(records, Dimension::Eligibility),
        age_by_sex,
        monthly: monthly_occurrences(table),
        top_by_eligibility,
        category_series: category_series(table, selection, &options),
        category_options: options,
    }
}

fn category_series(table: &ClaimTable, selection: &Selection, options: &[String]) -> CategorySeries {
    let eligibility = selection.eligibility();
    let category = selection.category.clone().or_else(|| options.first().cloned());
    let outcome = match (&category, eligibility.is_empty()) {
        (_, true) => SeriesOutcome::NoSelection,
        (Some(c), false) => build_series(
            table,
            &SeriesFilter {
                eligibility: eligibility.clone(),
                category: c.clone(),
            },
        ),
        // No categories at all means no rows, hence no window.
        (None, false) => SeriesOutcome::Series(Vec::new()),
    };
    CategorySeries {
        eligibility,
        category,
        outcome,
    }
}

pub fn render_analysis(table: &ClaimTable, profiles: &ProfileConfig) -> Result<AnalysisView> {
    if !table.has_clusters() {
        return Err(DashboardError::MissingClusters);
    }
    Ok(AnalysisView {
        profiles: compare_profiles(table, profiles),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::record;

    fn table() -> ClaimTable {
        let mut a = record(0, "a", "Exame", Eligibility::Policyholder, "Lab");
        a.sex = "F".to_string();
        let b = record(1, "b", "Consulta", Eligibility::Dependent, "Hospital");
        let mut c = record(2, "a", "Exame", Eligibility::Policyholder, "Lab");
        c.cluster_id = Some(8);
        ClaimTable::new(vec![a, b, c])
    }

    #[test]
    fn test_navigation_toggle() {
        assert_eq!(View::default(), View::Home);
        assert_eq!(View::Home.apply(Action::ViewAnalyses), View::Analysis);
        assert_eq!(View::Analysis.apply(Action::ReturnHome), View::Home);
        assert_eq!(View::Analysis.apply(Action::ViewAnalyses), View::Analysis);
    }

    #[test]
    fn test_home_defaults() {
        let home = render_home(&table(), &Selection::default());
        assert_eq!(home.summary.total_claims, 3);
        assert_eq!(home.category_options, vec!["Consulta", "Exame"]);
        assert_eq!(home.category_series.category.as_deref(), Some("Consulta"));
        assert_eq!(home.category_series.eligibility, vec![Eligibility::Policyholder]);
        // Consulta rows are all dependents: present but all zero.
        let buckets = home.category_series.outcome.buckets().unwrap();
        assert!(buckets.iter().all(|b| b.count == 0));
        assert!(home.sex.iter().any(|g| g.key == "Feminino" && g.count == 1));
        assert!(home.age_by_sex.iter().all(|r| r.secondary == "Masculino" || r.secondary == "Feminino"));
        assert_eq!(home.top_by_eligibility[0].categories[0].key, "Exame");
        assert_eq!(home.top_by_eligibility[1].providers[0].key, "Hospital");
    }

    #[test]
    fn test_empty_eligibility_selection() {
        let sel = Selection {
            eligibility: Some(vec![]),
            category: Some("Exame".to_string()),
        };
        let home = render_home(&table(), &sel);
        assert_eq!(home.category_series.outcome, SeriesOutcome::NoSelection);
    }

    #[test]
    fn test_analysis_requires_clusters() {
        let cfg = ProfileConfig::default();
        let rendered = render(View::Analysis, &table(), &Selection::default(), &cfg).unwrap();
        match rendered {
            Rendered::Analysis(a) => assert_eq!(a.profiles[0].claims, 1),
            Rendered::Home(_) => panic!("expected analysis view"),
        }
        let plain = ClaimTable::new(vec![record(0, "a", "Exame", Eligibility::Policyholder, "Lab")]);
        assert!(matches!(
            render(View::Analysis, &plain, &Selection::default(), &cfg),
            Err(DashboardError::MissingClusters)
        ));
    }
}
