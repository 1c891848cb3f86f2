use super::error::{ConfigurationError, InvalidInput};
use serde::{Deserialize, Serialize};

/// Label returned when no tier threshold is at or below the score.
pub const UNKNOWN_RISK_LEVEL: &str = "Unknown";

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTier {
    pub threshold: i64,
    pub label: String,
}

impl RiskTier {
    pub fn new(threshold: i64, label: impl Into<String>) -> Self {
        Self {
            threshold,
            label: label.into(),
        }
    }
}

/// Tier table kept sorted from the highest threshold down.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskTiers {
    tiers: Vec<RiskTier>,
}

impl RiskTiers {
    pub fn new(mut tiers: Vec<RiskTier>) -> Result<Self, ConfigurationError> {
        if tiers.is_empty() {
            return Err(ConfigurationError::EmptyTiers);
        }

        tiers.sort_by(|a, b| b.threshold.cmp(&a.threshold));
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[RiskTier] {
        &self.tiers
    }

    /// Label of the first tier whose threshold does not exceed `score`.
    pub fn classify(&self, score: i64) -> Result<&str, InvalidInput> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(InvalidInput::ScoreOutOfRange(score));
        }

        Ok(self
            .tiers
            .iter()
            .find(|tier| tier.threshold <= score)
            .map(|tier| tier.label.as_str())
            .unwrap_or(UNKNOWN_RISK_LEVEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> RiskTiers {
        RiskTiers::new(vec![
            RiskTier::new(30, "Med-low"),
            RiskTier::new(0, "Low"),
            RiskTier::new(70, "High"),
            RiskTier::new(50, "Med-high"),
        ])
        .expect("tiers build")
    }

    #[test]
    fn tiers_are_sorted_descending() {
        let thresholds: Vec<i64> = tiers().tiers().iter().map(|t| t.threshold).collect();
        assert_eq!(thresholds, vec![70, 50, 30, 0]);
    }

    #[test]
    fn classify_walks_thresholds_from_the_top() {
        let tiers = tiers();
        assert_eq!(tiers.classify(69), Ok("Med-high"));
        assert_eq!(tiers.classify(70), Ok("High"));
        assert_eq!(tiers.classify(0), Ok("Low"));
        assert_eq!(tiers.classify(100), Ok("High"));
        assert_eq!(tiers.classify(30), Ok("Med-low"));
    }

    #[test]
    fn classify_is_monotonic_over_the_whole_range() {
        let tiers = tiers();
        let mut previous = i64::MIN;
        for score in MIN_SCORE..=MAX_SCORE {
            let label = tiers.classify(score).expect("score in range");
            let threshold = tiers
                .tiers()
                .iter()
                .find(|tier| tier.label == label)
                .map(|tier| tier.threshold)
                .expect("label belongs to a tier");
            assert!(threshold >= previous);
            previous = threshold;
        }
    }

    #[test]
    fn classify_rejects_out_of_range_scores() {
        assert_eq!(tiers().classify(101), Err(InvalidInput::ScoreOutOfRange(101)));
        assert_eq!(tiers().classify(-1), Err(InvalidInput::ScoreOutOfRange(-1)));
    }

    #[test]
    fn missing_catch_all_returns_unknown() {
        let tiers = RiskTiers::new(vec![RiskTier::new(50, "High")]).expect("tiers build");
        assert_eq!(tiers.classify(10), Ok(UNKNOWN_RISK_LEVEL));
    }

    #[test]
    fn empty_tier_list_is_a_configuration_error() {
        assert_eq!(RiskTiers::new(Vec::new()), Err(ConfigurationError::EmptyTiers));
    }
}
