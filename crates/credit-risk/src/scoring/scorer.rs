use super::error::{InvalidInput, ScoringError};
use super::record::CustomerRecord;
use super::rules::{FieldScore, RuleEngine};
use super::tiers::{RiskTiers, MAX_SCORE, MIN_SCORE};
use super::value::FieldValue;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

pub const CUSTOMER_ID_COLUMN: &str = "customer_id";
pub const RISK_SCORE_COLUMN: &str = "risk_score";
pub const RISK_LEVEL_COLUMN: &str = "risk_level";

/// Sums field scores into a bounded total and maps it onto risk tiers.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    engine: RuleEngine,
    tiers: RiskTiers,
}

impl RiskScorer {
    pub fn new(engine: RuleEngine, tiers: RiskTiers) -> Self {
        Self { engine, tiers }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn tiers(&self) -> &RiskTiers {
        &self.tiers
    }

    /// Per-field contributions in configuration order.
    pub fn breakdown(&self, record: &CustomerRecord) -> Result<Vec<FieldScore>, ScoringError> {
        if record.is_empty() {
            return Err(InvalidInput::EmptyRecord.into());
        }

        self.engine
            .rules()
            .iter()
            .map(|rule| {
                let value = record
                    .get(&rule.column)
                    .ok_or_else(|| ScoringError::FieldLookup {
                        field: rule.field.clone(),
                        column: rule.column.clone(),
                    })?;
                Ok(self.engine.score_rule(rule, value))
            })
            .collect()
    }

    /// Total score for one record, clamped to 0..=100.
    pub fn score_record(&self, record: &CustomerRecord) -> Result<i64, ScoringError> {
        let total = self
            .breakdown(record)?
            .iter()
            .fold(0_i64, |total, component| total.saturating_add(component.score));

        Ok(total.clamp(MIN_SCORE, MAX_SCORE))
    }

    pub fn classify(&self, score: i64) -> Result<&str, ScoringError> {
        Ok(self.tiers.classify(score)?)
    }

    /// Scores every record in order without touching the input batch.
    pub fn generate_report(&self, records: &[CustomerRecord]) -> Result<RiskReport, ScoringError> {
        if records.is_empty() {
            return Err(InvalidInput::EmptyBatch.into());
        }

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let risk_score = self.score_record(record)?;
                let risk_level = self.classify(risk_score)?.to_string();
                Ok(RiskAssessment {
                    customer_id: index + 1,
                    record: record.clone(),
                    risk_score,
                    risk_level,
                })
            })
            .collect::<Result<Vec<_>, ScoringError>>()?;

        debug!(customers = rows.len(), "risk report generated");
        Ok(RiskReport { rows })
    }
}

/// A source record enriched with its id, score and tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub customer_id: usize,
    pub record: CustomerRecord,
    pub risk_score: i64,
    pub risk_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    rows: Vec<RiskAssessment>,
}

impl RiskReport {
    pub fn rows(&self) -> &[RiskAssessment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a 1-based customer id.
    pub fn customer(&self, customer_id: usize) -> Option<&RiskAssessment> {
        customer_id
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
    }

    /// `customer_id`, every source column in first-seen order, then score and level.
    ///
    /// Source columns that collide with the generated ones are dropped.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![CUSTOMER_ID_COLUMN.to_string()];
        let mut seen = HashSet::new();
        for row in &self.rows {
            for column in row.record.columns() {
                if !is_generated_column(column) && seen.insert(column) {
                    columns.push(column.to_string());
                }
            }
        }
        columns.push(RISK_SCORE_COLUMN.to_string());
        columns.push(RISK_LEVEL_COLUMN.to_string());
        columns
    }

    /// Cell values for one row, aligned with `columns`. Absent fields render empty.
    pub fn cells(&self, columns: &[String], row: &RiskAssessment) -> Vec<String> {
        columns
            .iter()
            .map(|column| match column.as_str() {
                CUSTOMER_ID_COLUMN => row.customer_id.to_string(),
                RISK_SCORE_COLUMN => row.risk_score.to_string(),
                RISK_LEVEL_COLUMN => row.risk_level.clone(),
                other => row
                    .record
                    .get(other)
                    .map(FieldValue::to_string)
                    .unwrap_or_default(),
            })
            .collect()
    }
}

fn is_generated_column(column: &str) -> bool {
    matches!(
        column,
        CUSTOMER_ID_COLUMN | RISK_SCORE_COLUMN | RISK_LEVEL_COLUMN
    )
}
