use crate::error::{DashboardError, Result};
use crate::types::{ClaimRecord, ClaimTable, Eligibility, RawRow};
use crate::util::{non_empty, parse_amount, parse_cluster, parse_date, title_case};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::io::Read;
use std::path::Path;

/// What to do with a row that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedRows {
    /// The first bad row aborts the load.
    #[default]
    Abort,
    /// Bad rows are dropped and counted in the [`LoadReport`].
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub first_error: Option<String>,
}

pub fn load_path(path: impl AsRef<Path>, mode: MalformedRows) -> Result<(ClaimTable, LoadReport)> {
    let path = path.as_ref();
    info!("loading claims from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_reader(file, mode)
}

/// Header names of the uploaded file, used to name the column of a row that
/// fails to decode.
const COLUMNS: [&str; 9] = [
    "segurado",
    "categoria",
    "elegibilidade_sinistro",
    "sexo_colaborador_sinistro",
    "faixa_etaria_colaborador_sinistro",
    "nome_prestador_sinistro",
    "valor_pago_sinistro",
    "data_ocorrencia_sinistro",
    "cluster",
];

/// Collects normalized rows, applying the [`MalformedRows`] policy to every
/// failure so decode errors and validation errors are handled the same way.
struct Collector {
    mode: MalformedRows,
    records: Vec<ClaimRecord>,
    report: LoadReport,
}

impl Collector {
    fn new(mode: MalformedRows) -> Self {
        Collector {
            mode,
            records: Vec::new(),
            report: LoadReport::default(),
        }
    }

    fn push(&mut self, outcome: Result<ClaimRecord>) -> Result<()> {
        self.report.total_rows += 1;
        match outcome {
            Ok(record) => self.records.push(record),
            Err(e) if self.mode == MalformedRows::Skip => {
                debug!("skipping row: {}", e);
                self.report.skipped_rows += 1;
                self.report.first_error.get_or_insert_with(|| e.to_string());
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn finish(mut self) -> (ClaimTable, LoadReport) {
        self.report.loaded_rows = self.records.len();
        if self.report.skipped_rows > 0 {
            warn!(
                "skipped {} of {} rows with malformed values",
                self.report.skipped_rows, self.report.total_rows
            );
        }
        info!("normalized {} claim records", self.report.loaded_rows);
        (ClaimTable::new(self.records), self.report)
    }
}

/// Map a CSV failure on one record to a row-level parse error. Errors that
/// are not tied to a single record (I/O) are returned unchanged.
fn decode_error(row_index: usize, headers: &csv::StringRecord, err: csv::Error) -> DashboardError {
    let column_at = |field: Option<usize>| {
        field
            .and_then(|i| headers.get(i))
            .and_then(|name| COLUMNS.iter().copied().find(|c| *c == name))
            .unwrap_or("<record>")
    };
    let column = match err.kind() {
        csv::ErrorKind::Deserialize { err: de, .. } => Some(column_at(de.field().map(|i| i as usize))),
        csv::ErrorKind::Utf8 { err: utf8, .. } => Some(column_at(Some(utf8.field()))),
        csv::ErrorKind::UnequalLengths { .. } => Some("<record>"),
        _ => None,
    };
    match column {
        Some(column) => DashboardError::parse(row_index, column, "", err.to_string()),
        None => DashboardError::Csv(err),
    }
}

pub fn load_reader<R: Read>(reader: R, mode: MalformedRows) -> Result<(ClaimTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut collector = Collector::new(mode);
    for (row_index, result) in rdr.deserialize::<RawRow>().enumerate() {
        let outcome = match result {
            Ok(row) => normalize_row(row_index, &row),
            Err(e) => match decode_error(row_index, &headers, e) {
                DashboardError::Csv(io) => return Err(DashboardError::Csv(io)),
                parse => Err(parse),
            },
        };
        collector.push(outcome)?;
    }
    Ok(collector.finish())
}

/// Turn uploaded rows into the canonical table.
///
/// Categorical text is case-folded and title-cased and dates are parsed
/// from `DD/MM/YYYY`. The input slice is never modified, and feeding the
/// output back through [`ClaimTable::to_raw_rows`] reproduces the same
/// table.
pub fn normalize(rows: &[RawRow], mode: MalformedRows) -> Result<(ClaimTable, LoadReport)> {
    let mut collector = Collector::new(mode);
    for (row_index, row) in rows.iter().enumerate() {
        collector.push(normalize_row(row_index, row))?;
    }
    Ok(collector.finish())
}

fn required<'a>(row_index: usize, column: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    non_empty(value.as_deref()).ok_or_else(|| DashboardError::parse(row_index, column, "", "missing value"))
}

pub fn normalize_row(row_index: usize, row: &RawRow) -> Result<ClaimRecord> {
    let claimant_id = required(row_index, "segurado", &row.claimant_id)?.to_string();
    let category = title_case(&required(row_index, "categoria", &row.category)?.to_lowercase());

    let raw_eligibility = required(row_index, "elegibilidade_sinistro", &row.eligibility)?;
    let eligibility = Eligibility::from_canonical(&title_case(&raw_eligibility.to_lowercase()))
        .ok_or_else(|| {
            DashboardError::parse(
                row_index,
                "elegibilidade_sinistro",
                raw_eligibility,
                "expected Titular or Dependente",
            )
        })?;

    let sex = required(row_index, "sexo_colaborador_sinistro", &row.sex)?.to_string();
    let age_bracket = required(row_index, "faixa_etaria_colaborador_sinistro", &row.age_bracket)?.to_string();
    let provider_name = required(row_index, "nome_prestador_sinistro", &row.provider_name)?.to_string();

    let raw_amount = required(row_index, "valor_pago_sinistro", &row.paid_amount)?;
    let paid_amount = parse_amount(raw_amount).ok_or_else(|| {
        DashboardError::parse(row_index, "valor_pago_sinistro", raw_amount, "expected a non-negative number")
    })?;

    let raw_date = required(row_index, "data_ocorrencia_sinistro", &row.occurrence_date)?;
    let occurrence_date = parse_date(raw_date).ok_or_else(|| {
        DashboardError::parse(row_index, "data_ocorrencia_sinistro", raw_date, "expected DD/MM/YYYY")
    })?;

    let cluster_id = match non_empty(row.cluster.as_deref()) {
        Some(raw) => Some(
            parse_cluster(raw)
                .ok_or_else(|| DashboardError::parse(row_index, "cluster", raw, "expected an integer"))?,
        ),
        None => None,
    };

    Ok(ClaimRecord {
        row_index,
        claimant_id,
        category,
        eligibility,
        sex,
        age_bracket,
        provider_name,
        paid_amount,
        occurrence_date,
        cluster_id,
    })
}
