//! Declarative rule files.
//!
//! A rule file lists each scored field with one of four rule shapes plus the
//! tier table:
//!
//! ```json
//! {
//!   "fields": [
//!     { "field": "Duration", "rule": { "kind": "range", "entries": [
//!         { "above": 36, "score": 15 }, { "above": 12, "score": 5 } ] } },
//!     { "field": "Sex", "rule": { "kind": "mapping", "values": { "male": 2 } } }
//!   ],
//!   "tiers": [ { "threshold": 50, "label": "High risk" },
//!              { "threshold": 0, "label": "Low risk" } ]
//! }
//! ```

use super::error::ConfigurationError;
use super::rules::{
    Condition, DefaultScore, FieldRuleSpec, RangeRule, RangeTest, RuleEngine,
};
use super::scorer::RiskScorer;
use super::tiers::{RiskTier, RiskTiers};
use super::value::MappingKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetConfig {
    pub fields: Vec<FieldRuleConfig>,
    pub tiers: Vec<RiskTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRuleConfig {
    pub field: String,
    pub rule: RuleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum RuleConfig {
    Range {
        entries: Vec<RangeEntryConfig>,
    },
    DefaultWithOverrides {
        default: DefaultScore,
        #[serde(default)]
        specific: BTreeMap<MappingKey, i64>,
    },
    Mapping {
        values: BTreeMap<MappingKey, i64>,
    },
    Empty,
}

/// One range entry: exactly one of `when` or `above` must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeEntryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    pub score: i64,
}

impl RangeEntryConfig {
    pub fn when(condition: Condition, score: i64) -> Self {
        Self {
            when: Some(condition),
            above: None,
            score,
        }
    }

    pub fn above(threshold: f64, score: i64) -> Self {
        Self {
            when: None,
            above: Some(threshold),
            score,
        }
    }

    fn into_rule(self, field: &str) -> Result<RangeRule, ConfigurationError> {
        let test = match (self.when, self.above) {
            (Some(condition), None) => RangeTest::When(Arc::new(condition)),
            (None, Some(threshold)) if threshold.is_finite() => RangeTest::Above(threshold),
            (None, Some(_)) => {
                return Err(malformed(field, "range threshold must be a finite number"))
            }
            (Some(_), Some(_)) => {
                return Err(malformed(field, "range entry sets both 'when' and 'above'"))
            }
            (None, None) => {
                return Err(malformed(field, "range entry needs 'when' or 'above'"))
            }
        };

        Ok(RangeRule {
            test,
            score: self.score,
        })
    }
}

impl RuleConfig {
    fn into_spec(self, field: &str) -> Result<FieldRuleSpec, ConfigurationError> {
        Ok(match self {
            RuleConfig::Range { entries } => {
                if entries.is_empty() {
                    return Err(malformed(field, "range rule has no entries"));
                }
                FieldRuleSpec::RangeRules(
                    entries
                        .into_iter()
                        .map(|entry| entry.into_rule(field))
                        .collect::<Result<_, _>>()?,
                )
            }
            RuleConfig::DefaultWithOverrides { default, specific } => {
                FieldRuleSpec::DefaultWithOverrides {
                    default: Arc::new(default),
                    specific: specific.into_iter().collect(),
                }
            }
            RuleConfig::Mapping { values } => {
                FieldRuleSpec::DirectMapping(values.into_iter().collect())
            }
            RuleConfig::Empty => FieldRuleSpec::Empty,
        })
    }
}

impl RuleSetConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(raw).map_err(|err| ConfigurationError::Parse(err.to_string()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigurationError> {
        serde_json::from_reader(reader).map_err(|err| ConfigurationError::Parse(err.to_string()))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| {
            ConfigurationError::Parse(format!("cannot open {}: {err}", path.display()))
        })?;
        let config = Self::from_reader(std::io::BufReader::new(file))?;
        info!(path = %path.display(), fields = config.fields.len(), "loaded rule configuration");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigurationError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigurationError::Parse(err.to_string()))
    }

    pub fn build(self) -> Result<RiskScorer, ConfigurationError> {
        let tiers = RiskTiers::new(self.tiers)?;
        let rules = self
            .fields
            .into_iter()
            .map(|entry| {
                let spec = entry.rule.into_spec(&entry.field)?;
                Ok((entry.field, spec))
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;

        Ok(RiskScorer::new(RuleEngine::new(rules)?, tiers))
    }
}

fn malformed(field: &str, reason: &str) -> ConfigurationError {
    ConfigurationError::Malformed {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
