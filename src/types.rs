use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One CSV row as uploaded. Every cell is optional text; validation happens
/// in the loader.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRow {
    #[serde(rename = "segurado")]
    pub claimant_id: Option<String>,
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    #[serde(rename = "elegibilidade_sinistro")]
    pub eligibility: Option<String>,
    #[serde(rename = "sexo_colaborador_sinistro")]
    pub sex: Option<String>,
    #[serde(rename = "faixa_etaria_colaborador_sinistro")]
    pub age_bracket: Option<String>,
    #[serde(rename = "nome_prestador_sinistro")]
    pub provider_name: Option<String>,
    #[serde(rename = "valor_pago_sinistro")]
    pub paid_amount: Option<String>,
    #[serde(rename = "data_ocorrencia_sinistro")]
    pub occurrence_date: Option<String>,
    #[serde(rename = "cluster", default)]
    pub cluster: Option<String>,
}

/// Whether the claimant is the plan's primary holder or a dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Eligibility {
    #[serde(rename = "Titular")]
    Policyholder,
    #[serde(rename = "Dependente")]
    Dependent,
}

impl Eligibility {
    pub const ALL: [Eligibility; 2] = [Eligibility::Policyholder, Eligibility::Dependent];

    /// Canonical (title-cased) label as it appears in the dataset.
    pub fn label(self) -> &'static str {
        match self {
            Eligibility::Policyholder => "Titular",
            Eligibility::Dependent => "Dependente",
        }
    }

    /// Match an already title-cased value.
    pub fn from_canonical(s: &str) -> Option<Self> {
        match s {
            "Titular" | "Policyholder" => Some(Eligibility::Policyholder),
            "Dependente" | "Dependent" => Some(Eligibility::Dependent),
            _ => None,
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized claim. Only the loader constructs these, so categorical
/// fields always carry their canonical casing.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    /// Position in the uploaded file; the ordering key for "first occurrence".
    pub row_index: usize,
    pub claimant_id: String,
    pub category: String,
    pub eligibility: Eligibility,
    pub sex: String,
    pub age_bracket: String,
    pub provider_name: String,
    pub paid_amount: f64,
    pub occurrence_date: NaiveDate,
    pub cluster_id: Option<i64>,
}

impl From<&ClaimRecord> for RawRow {
    fn from(r: &ClaimRecord) -> Self {
        RawRow {
            claimant_id: Some(r.claimant_id.clone()),
            category: Some(r.category.clone()),
            eligibility: Some(r.eligibility.label().to_string()),
            sex: Some(r.sex.clone()),
            age_bracket: Some(r.age_bracket.clone()),
            provider_name: Some(r.provider_name.clone()),
            paid_amount: Some(r.paid_amount.to_string()),
            occurrence_date: Some(r.occurrence_date.format(crate::util::DATE_FORMAT).to_string()),
            cluster: r.cluster_id.map(|c| c.to_string()),
        }
    }
}

/// The immutable, normalized dataset held for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimTable {
    records: Vec<ClaimRecord>,
}

impl ClaimTable {
    pub(crate) fn new(records: Vec<ClaimRecord>) -> Self {
        ClaimTable { records }
    }

    pub fn records(&self) -> &[ClaimRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_clusters(&self) -> bool {
        self.records.iter().any(|r| r.cluster_id.is_some())
    }

    /// Rows in the shape they were uploaded, with normalized values.
    pub fn to_raw_rows(&self) -> Vec<RawRow> {
        self.records.iter().map(RawRow::from).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct GroupCount {
    #[tabled(rename = "Value")]
    pub key: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct CrossCount {
    #[tabled(rename = "Primary")]
    pub primary: String,
    #[tabled(rename = "Secondary")]
    pub secondary: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// A calendar month; the day is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month(NaiveDate);

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        // Day 1 exists in every month.
        Month(date.with_day(1).unwrap_or(date))
    }

    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Month)
    }

    pub fn next(self) -> Option<Self> {
        self.0.checked_add_months(chrono::Months::new(1)).map(Month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl Serialize for Month {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Tabled)]
pub struct MonthlyBucket {
    #[tabled(rename = "Month")]
    pub month: Month,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// One profile row of the analysis view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub rank: String,
    pub cluster_id: i64,
    pub description: Option<String>,
    pub claims: usize,
    pub claimants: usize,
    pub top_categories: Vec<GroupCount>,
    pub top_providers: Vec<GroupCount>,
    pub mean_paid: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ProfileRow {
    #[serde(rename = "Perfil")]
    #[tabled(rename = "Perfil")]
    pub rank: String,
    #[serde(rename = "Cluster")]
    #[tabled(rename = "Cluster")]
    pub cluster_id: i64,
    #[serde(rename = "Sinistros")]
    #[tabled(rename = "Sinistros")]
    pub claims: usize,
    #[serde(rename = "Segurados")]
    #[tabled(rename = "Segurados")]
    pub claimants: usize,
    #[serde(rename = "MediaValorPago")]
    #[tabled(rename = "MediaValorPago")]
    pub mean_paid: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ProfileTopRow {
    #[serde(rename = "Perfil")]
    #[tabled(rename = "Perfil")]
    pub rank: String,
    #[serde(rename = "Valor")]
    #[tabled(rename = "Valor")]
    pub key: String,
    #[serde(rename = "Quantidade")]
    #[tabled(rename = "Quantidade")]
    pub count: usize,
}

impl From<&ProfileSummary> for ProfileRow {
    fn from(p: &ProfileSummary) -> Self {
        ProfileRow {
            rank: p.rank.clone(),
            cluster_id: p.cluster_id,
            claims: p.claims,
            claimants: p.claimants,
            mean_paid: crate::util::format_number(p.mean_paid, 2),
        }
    }
}
