//! Rule-based risk scoring: per-field rules, bounded totals and tier labels.

mod error;
mod german;
mod record;
mod rules;
mod schema;
mod scorer;
mod tiers;
mod value;

pub use error::{ConfigurationError, InvalidInput, ScoringError};
pub use german::german_credit_rules;
pub use record::CustomerRecord;
pub use rules::{
    Condition, DefaultScore, EvaluationFailure, FieldRule, FieldRuleSpec, FieldScore,
    NamedPredicate, NamedScoreFunction, RangeRule, RangeTest, RuleEngine, RuleKind,
    ScoreFunction, ValuePredicate,
};
pub use schema::{FieldRuleConfig, RangeEntryConfig, RuleConfig, RuleSetConfig};
pub use scorer::{
    RiskAssessment, RiskReport, RiskScorer, CUSTOMER_ID_COLUMN, RISK_LEVEL_COLUMN,
    RISK_SCORE_COLUMN,
};
pub use tiers::{RiskTier, RiskTiers, MAX_SCORE, MIN_SCORE, UNKNOWN_RISK_LEVEL};
pub use value::{FieldValue, MappingKey};
