//! Command-line arguments for the dashboard binary.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use unidata::aggregate::Dimension;
use unidata::types::Eligibility;

#[derive(Debug, Parser)]
#[command(name = "unidata", version, about = "Health-plan claims dashboard")]
pub struct Args {
    /// Claims CSV uploaded by the operator
    #[arg(long, short, global = true, default_value = "sinistros.csv")]
    pub input: PathBuf,

    /// JSON file mapping cluster IDs to profile ranks
    #[arg(long, global = true)]
    pub profiles: Option<PathBuf>,

    /// Drop malformed rows instead of aborting the load
    #[arg(long, global = true)]
    pub skip_malformed: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EligibilityArg {
    Titular,
    Dependente,
}

impl From<EligibilityArg> for Eligibility {
    fn from(e: EligibilityArg) -> Self {
        match e {
            EligibilityArg::Titular => Eligibility::Policyholder,
            EligibilityArg::Dependente => Eligibility::Dependent,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive dashboard with home and analysis views (default)
    Dashboard,
    /// Print the headline statistics
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Print every table of the home view
    Home {
        /// Eligibility classes for the category series
        #[arg(long, value_enum)]
        eligibility: Vec<EligibilityArg>,

        /// Category for the series; defaults to the first option
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Print the profile comparison
    Analysis {
        #[arg(long)]
        json: bool,
    },
    /// Print the monthly series for one category
    Series {
        #[arg(long, value_enum, required = true)]
        eligibility: Vec<EligibilityArg>,

        #[arg(long)]
        category: String,
    },
    /// Group and count by one or two fields
    Aggregate {
        #[arg(value_enum)]
        dimension: Dimension,

        /// Second field for a cross-tab
        #[arg(long, value_enum)]
        by: Option<Dimension>,

        /// Keep only the K largest groups (single-field counts only)
        #[arg(long, conflicts_with = "by")]
        top: Option<usize>,
    },
    /// Write every table and the normalized dataset to a directory
    Export {
        #[arg(long, default_value = "reports")]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_rejected_with_cross_tab() {
        let err = Args::try_parse_from(["unidata", "aggregate", "category", "--by", "sex", "--top", "3"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_top_on_single_field() {
        let args = Args::try_parse_from(["unidata", "aggregate", "provider", "--top", "3"]).unwrap();
        match args.command {
            Some(Commands::Aggregate { dimension, by, top }) => {
                assert_eq!(dimension, Dimension::Provider);
                assert_eq!(by, None);
                assert_eq!(top, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
