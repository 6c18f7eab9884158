use thiserror::Error;

/// Everything that can abort a single render pass.
///
/// An empty filter result is not represented here: components return empty
/// or zero-filled outputs for it instead.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("row {row}: invalid value {value:?} in column `{column}`: {reason}")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("metric undefined: division by zero ({0})")]
    DivisionByZero(&'static str),

    #[error("dataset has no `cluster` values; run the clustering step before opening the analysis view")]
    MissingClusters,

    #[error("profile configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn parse(row: usize, column: &'static str, value: &str, reason: impl Into<String>) -> Self {
        DashboardError::Parse {
            row,
            column,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
