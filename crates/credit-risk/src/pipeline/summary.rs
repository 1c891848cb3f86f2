use super::error::PipelineError;
use crate::scoring::{RiskReport, RiskTiers, UNKNOWN_RISK_LEVEL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Customers per risk level, in tier order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCount {
    pub label: String,
    pub threshold: Option<i64>,
    pub customers: usize,
    pub share: f64,
}

/// Aggregate view of a risk report for stakeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub generated_at: DateTime<Utc>,
    pub customers: usize,
    pub mean_score: f64,
    pub distribution: Vec<TierCount>,
}

impl RiskSummary {
    pub fn from_report(report: &RiskReport, tiers: &RiskTiers, generated_at: DateTime<Utc>) -> Self {
        let customers = report.len();
        let share = |count: usize| {
            if customers == 0 {
                0.0
            } else {
                count as f64 / customers as f64
            }
        };
        let count_label = |label: &str| {
            report
                .rows()
                .iter()
                .filter(|row| row.risk_level == label)
                .count()
        };

        let mut distribution: Vec<TierCount> = tiers
            .tiers()
            .iter()
            .map(|tier| {
                let count = count_label(&tier.label);
                TierCount {
                    label: tier.label.clone(),
                    threshold: Some(tier.threshold),
                    customers: count,
                    share: share(count),
                }
            })
            .collect();

        let unknown = count_label(UNKNOWN_RISK_LEVEL);
        if unknown > 0 {
            distribution.push(TierCount {
                label: UNKNOWN_RISK_LEVEL.to_string(),
                threshold: None,
                customers: unknown,
                share: share(unknown),
            });
        }

        let total: i64 = report.rows().iter().map(|row| row.risk_score).sum();
        let mean_score = if customers == 0 {
            0.0
        } else {
            total as f64 / customers as f64
        };

        Self {
            generated_at,
            customers,
            mean_score,
            distribution,
        }
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!(path = %path.display(), "risk summary saved");
        Ok(())
    }
}
