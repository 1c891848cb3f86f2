//! Load, clean, encode, score and persist a credit dataset.

mod cleaner;
mod encoder;
mod error;
mod loader;
mod reporter;
mod summary;

pub use cleaner::{clean_dataset, CleaningSummary, UNKNOWN_CATEGORY};
pub use encoder::{encode_dataset, ColumnEncoding};
pub use error::PipelineError;
pub use loader::{load_path, load_reader, Dataset};
pub use reporter::{is_csv_path, save_dataset, save_report, write_dataset, write_report};
pub use summary::{RiskSummary, TierCount};

use crate::scoring::{RiskReport, RiskScorer};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Column roles and encodings applied before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparationProfile {
    pub categorical: Vec<String>,
    pub numerical: Vec<String>,
    pub encodings: Vec<ColumnEncoding>,
}

impl PreparationProfile {
    /// German Credit preparation; `Sex` stays textual to match the scoring keys.
    pub fn german_credit() -> Self {
        Self {
            categorical: to_strings(&[
                "Sex",
                "Housing",
                "Saving accounts",
                "Checking account",
                "Purpose",
            ]),
            numerical: to_strings(&["Age", "Job", "Credit amount", "Duration"]),
            encodings: vec![
                ColumnEncoding::new(
                    "Housing",
                    [("own", 2), ("free", 1), ("rent", 0), ("unknown", -1)],
                ),
                ColumnEncoding::new(
                    "Saving accounts",
                    [
                        ("unknown", 0),
                        ("little", 1),
                        ("moderate", 2),
                        ("quite rich", 3),
                        ("rich", 4),
                    ],
                ),
                ColumnEncoding::new(
                    "Checking account",
                    [("unknown", 0), ("little", 1), ("moderate", 2), ("rich", 3)],
                ),
            ],
        }
    }

    /// Cleans then encodes `dataset` in place.
    pub fn prepare(&self, dataset: &mut Dataset) -> Result<(), PipelineError> {
        clean_dataset(dataset, self.categorical.as_slice(), self.numerical.as_slice())?;
        encode_dataset(dataset, &self.encodings);
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Result of one pipeline run: the prepared table and its risk report.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub dataset: Dataset,
    pub report: RiskReport,
}

pub struct CreditRiskPipeline {
    profile: PreparationProfile,
    scorer: RiskScorer,
}

impl CreditRiskPipeline {
    pub fn new(profile: PreparationProfile, scorer: RiskScorer) -> Self {
        Self { profile, scorer }
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    pub fn run_path<P: AsRef<Path>>(&self, input: P) -> Result<PipelineOutcome, PipelineError> {
        self.run_dataset(load_path(input)?)
    }

    pub fn run_reader<R: Read>(&self, reader: R) -> Result<PipelineOutcome, PipelineError> {
        self.run_dataset(load_reader(reader)?)
    }

    fn run_dataset(&self, mut dataset: Dataset) -> Result<PipelineOutcome, PipelineError> {
        self.profile.prepare(&mut dataset)?;
        let report = self.scorer.generate_report(&dataset.records)?;
        info!(customers = report.len(), "risk scoring completed");
        Ok(PipelineOutcome { dataset, report })
    }
}
