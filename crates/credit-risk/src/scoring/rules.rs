use crate::normalizer::normalize_field_name;
use super::value::{FieldValue, MappingKey};
use super::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Boolean test applied to a field value by a range rule.
pub trait ValuePredicate: fmt::Debug + Send + Sync {
    fn matches(&self, value: &FieldValue) -> bool;
}

/// Scoring function used as the fallback of a default-with-overrides rule.
pub trait ScoreFunction: fmt::Debug + Send + Sync {
    fn evaluate(&self, value: &FieldValue) -> Result<i64, EvaluationFailure>;
}

/// Failure raised by a [`ScoreFunction`]; the engine recovers from it locally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationFailure {
    #[error("expected a numeric value, found '{0}'")]
    NotNumeric(String),
    #[error("no score configured for '{0}'")]
    MissingKey(String),
}

/// Serializable predicate vocabulary for declarative rule files.
///
/// Numeric comparisons never match a non-numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Lt(f64),
    Le(f64),
    Gt(f64),
    Ge(f64),
    Eq(MappingKey),
    OneOf(Vec<MappingKey>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// `min <= x < max`
    pub fn between(min: f64, max: f64) -> Self {
        Self::All(vec![Self::Ge(min), Self::Lt(max)])
    }

    /// `min < x <= max`
    pub fn above_up_to(min: f64, max: f64) -> Self {
        Self::All(vec![Self::Gt(min), Self::Le(max)])
    }

    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            condition => Self::Any(vec![condition, other]),
        }
    }
}

impl ValuePredicate for Condition {
    fn matches(&self, value: &FieldValue) -> bool {
        match self {
            Condition::Lt(bound) => value.as_number().is_some_and(|x| x < *bound),
            Condition::Le(bound) => value.as_number().is_some_and(|x| x <= *bound),
            Condition::Gt(bound) => value.as_number().is_some_and(|x| x > *bound),
            Condition::Ge(bound) => value.as_number().is_some_and(|x| x >= *bound),
            Condition::Eq(key) => value.mapping_key().as_ref() == Some(key),
            Condition::OneOf(keys) => value
                .mapping_key()
                .is_some_and(|candidate| keys.contains(&candidate)),
            Condition::All(conditions) => conditions.iter().all(|c| c.matches(value)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.matches(value)),
            Condition::Not(condition) => !condition.matches(value),
        }
    }
}

/// Closure-backed predicate carrying a name for audit output.
pub struct NamedPredicate<F> {
    name: String,
    test: F,
}

impl<F> NamedPredicate<F>
where
    F: Fn(&FieldValue) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, test: F) -> Self {
        Self {
            name: name.into(),
            test,
        }
    }
}

impl<F> fmt::Debug for NamedPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedPredicate").field(&self.name).finish()
    }
}

impl<F> ValuePredicate for NamedPredicate<F>
where
    F: Fn(&FieldValue) -> bool + Send + Sync,
{
    fn matches(&self, value: &FieldValue) -> bool {
        (self.test)(value)
    }
}

/// Closure-backed scoring function carrying a name for audit output.
pub struct NamedScoreFunction<F> {
    name: String,
    score: F,
}

impl<F> NamedScoreFunction<F>
where
    F: Fn(&FieldValue) -> Result<i64, EvaluationFailure> + Send + Sync,
{
    pub fn new(name: impl Into<String>, score: F) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

impl<F> fmt::Debug for NamedScoreFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedScoreFunction").field(&self.name).finish()
    }
}

impl<F> ScoreFunction for NamedScoreFunction<F>
where
    F: Fn(&FieldValue) -> Result<i64, EvaluationFailure> + Send + Sync,
{
    fn evaluate(&self, value: &FieldValue) -> Result<i64, EvaluationFailure> {
        (self.score)(value)
    }
}

/// Serializable default scoring functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DefaultScore {
    /// `(ceiling - x) * step` when `x > 0`, `otherwise` for non-positive values.
    Descending {
        ceiling: f64,
        step: f64,
        otherwise: i64,
    },
    Constant { score: i64 },
    /// Fails with a lookup miss for values absent from the table.
    Lookup { table: HashMap<MappingKey, i64> },
}

impl ScoreFunction for DefaultScore {
    fn evaluate(&self, value: &FieldValue) -> Result<i64, EvaluationFailure> {
        match self {
            DefaultScore::Descending {
                ceiling,
                step,
                otherwise,
            } => {
                let x = value
                    .as_number()
                    .ok_or_else(|| EvaluationFailure::NotNumeric(value.to_string()))?;
                if x > 0.0 {
                    Ok(((ceiling - x) * step).round() as i64)
                } else {
                    Ok(*otherwise)
                }
            }
            DefaultScore::Constant { score } => Ok(*score),
            DefaultScore::Lookup { table } => value
                .mapping_key()
                .and_then(|key| table.get(&key).copied())
                .ok_or_else(|| EvaluationFailure::MissingKey(value.to_string())),
        }
    }
}

/// What triggers a single range rule entry.
#[derive(Debug, Clone)]
pub enum RangeTest {
    When(Arc<dyn ValuePredicate>),
    /// Strictly numeric `value > threshold`.
    Above(f64),
}

impl RangeTest {
    fn matches(&self, value: &FieldValue) -> bool {
        match self {
            RangeTest::When(predicate) => predicate.matches(value),
            RangeTest::Above(threshold) => value.as_number().is_some_and(|x| x > *threshold),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangeRule {
    pub test: RangeTest,
    pub score: i64,
}

impl RangeRule {
    pub fn when(predicate: impl ValuePredicate + 'static, score: i64) -> Self {
        Self {
            test: RangeTest::When(Arc::new(predicate)),
            score,
        }
    }

    pub fn above(threshold: f64, score: i64) -> Self {
        Self {
            test: RangeTest::Above(threshold),
            score,
        }
    }
}

/// Rule shape configured for one field.
#[derive(Debug, Clone)]
pub enum FieldRuleSpec {
    /// First matching entry wins; entries keep their configured order.
    RangeRules(Vec<RangeRule>),
    DefaultWithOverrides {
        default: Arc<dyn ScoreFunction>,
        specific: HashMap<MappingKey, i64>,
    },
    DirectMapping(HashMap<MappingKey, i64>),
    Empty,
}

impl FieldRuleSpec {
    pub fn kind(&self) -> RuleKind {
        match self {
            FieldRuleSpec::RangeRules(_) => RuleKind::Range,
            FieldRuleSpec::DefaultWithOverrides { .. } => RuleKind::DefaultWithOverrides,
            FieldRuleSpec::DirectMapping(_) => RuleKind::Mapping,
            FieldRuleSpec::Empty => RuleKind::Empty,
        }
    }

    fn score(&self, field: &str, value: &FieldValue) -> i64 {
        match self {
            FieldRuleSpec::RangeRules(rules) => rules
                .iter()
                .find(|rule| rule.test.matches(value))
                .map(|rule| rule.score)
                .unwrap_or(0),
            FieldRuleSpec::DefaultWithOverrides { default, specific } => {
                if let Some(score) = value.mapping_key().and_then(|key| specific.get(&key)) {
                    return *score;
                }

                match default.evaluate(value) {
                    Ok(score) => score,
                    Err(failure) => {
                        debug!(field, %failure, "default score failed, using fallback");
                        specific.get(&MappingKey::Int(0)).copied().unwrap_or(0)
                    }
                }
            }
            FieldRuleSpec::DirectMapping(mapping) => value
                .mapping_key()
                .and_then(|key| mapping.get(&key).copied())
                .unwrap_or(0),
            FieldRuleSpec::Empty => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Range,
    DefaultWithOverrides,
    Mapping,
    Empty,
}

impl RuleKind {
    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Range => "range",
            RuleKind::DefaultWithOverrides => "default/overrides",
            RuleKind::Mapping => "mapping",
            RuleKind::Empty => "empty",
        }
    }
}

/// A configured field together with the record column it reads.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: String,
    pub column: String,
    pub spec: FieldRuleSpec,
}

/// Discrete contribution of one field, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldScore {
    pub field: String,
    pub value: FieldValue,
    pub kind: RuleKind,
    pub score: i64,
}

/// Immutable per-field rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<FieldRule>,
}

impl RuleEngine {
    pub fn new<I, S>(rules: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, FieldRuleSpec)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut configured = Vec::new();

        for (field, spec) in rules {
            let field = field.into();
            if field.trim().is_empty() {
                return Err(ConfigurationError::Malformed {
                    field,
                    reason: "field name cannot be blank".to_string(),
                });
            }
            if !seen.insert(field.clone()) {
                return Err(ConfigurationError::DuplicateField(field));
            }

            let column = normalize_field_name(&field);
            configured.push(FieldRule {
                field,
                column,
                spec,
            });
        }

        Ok(Self { rules: configured })
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Score contributed by `field` for `value`; unconfigured fields score 0.
    pub fn score_field(&self, field: &str, value: &FieldValue) -> i64 {
        self.rules
            .iter()
            .find(|rule| rule.field == field)
            .map(|rule| rule.spec.score(&rule.field, value))
            .unwrap_or(0)
    }

    pub(crate) fn score_rule(&self, rule: &FieldRule, value: &FieldValue) -> FieldScore {
        FieldScore {
            field: rule.field.clone(),
            value: value.clone(),
            kind: rule.spec.kind(),
            score: rule.spec.score(&rule.field, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: &[(MappingKey, i64)]) -> HashMap<MappingKey, i64> {
        entries.iter().cloned().collect()
    }

    fn savings_rule() -> FieldRuleSpec {
        FieldRuleSpec::DefaultWithOverrides {
            default: Arc::new(DefaultScore::Descending {
                ceiling: 4.0,
                step: 3.0,
                otherwise: 10,
            }),
            specific: mapping(&[(MappingKey::Int(0), 10)]),
        }
    }

    #[test]
    fn range_rules_stop_at_first_match_in_configured_order() {
        let engine = RuleEngine::new([(
            "Age",
            FieldRuleSpec::RangeRules(vec![
                RangeRule::when(Condition::Gt(18.0), 3),
                RangeRule::when(Condition::Gt(40.0), 12),
            ]),
        )])
        .expect("engine builds");

        assert_eq!(engine.score_field("Age", &FieldValue::from(45)), 3);
        assert_eq!(engine.score_field("Age", &FieldValue::from(10)), 0);
    }

    #[test]
    fn thresholds_are_strict_and_ignore_text() {
        let engine = RuleEngine::new([(
            "Duration",
            FieldRuleSpec::RangeRules(vec![
                RangeRule::above(36.0, 15),
                RangeRule::above(24.0, 10),
                RangeRule::above(12.0, 5),
            ]),
        )])
        .expect("engine builds");

        assert_eq!(engine.score_field("Duration", &FieldValue::from(36)), 10);
        assert_eq!(engine.score_field("Duration", &FieldValue::from(37)), 15);
        assert_eq!(engine.score_field("Duration", &FieldValue::from(12)), 0);
        assert_eq!(engine.score_field("Duration", &FieldValue::from("long")), 0);
        assert_eq!(engine.score_field("Duration", &FieldValue::Missing), 0);
    }

    #[test]
    fn overrides_take_precedence_over_default() {
        let engine = RuleEngine::new([(
            "Saving accounts",
            FieldRuleSpec::DefaultWithOverrides {
                default: Arc::new(DefaultScore::Constant { score: 50 }),
                specific: mapping(&[(MappingKey::Int(2), 7)]),
            },
        )])
        .expect("engine builds");

        assert_eq!(engine.score_field("Saving accounts", &FieldValue::from(2)), 7);
        assert_eq!(engine.score_field("Saving accounts", &FieldValue::from(3)), 50);
    }

    #[test]
    fn default_function_scores_descending_values() {
        let engine = RuleEngine::new([("Saving accounts", savings_rule())]).expect("engine builds");

        assert_eq!(engine.score_field("Saving accounts", &FieldValue::from(0)), 10);
        assert_eq!(engine.score_field("Saving accounts", &FieldValue::from(1)), 9);
        assert_eq!(engine.score_field("Saving accounts", &FieldValue::from(4)), 0);
        assert_eq!(engine.score_field("Saving accounts", &FieldValue::from(-1)), 10);
    }

    #[test]
    fn failing_default_falls_back_to_zero_override() {
        let engine = RuleEngine::new([("Saving accounts", savings_rule())]).expect("engine builds");
        assert_eq!(
            engine.score_field("Saving accounts", &FieldValue::from("little")),
            10
        );

        let engine = RuleEngine::new([(
            "Checking account",
            FieldRuleSpec::DefaultWithOverrides {
                default: Arc::new(DefaultScore::Lookup {
                    table: mapping(&[(MappingKey::Int(1), 4)]),
                }),
                specific: HashMap::new(),
            },
        )])
        .expect("engine builds");
        assert_eq!(engine.score_field("Checking account", &FieldValue::from(1)), 4);
        assert_eq!(engine.score_field("Checking account", &FieldValue::from(9)), 0);
    }

    #[test]
    fn direct_mapping_defaults_to_zero() {
        let engine = RuleEngine::new([(
            "Sex",
            FieldRuleSpec::DirectMapping(mapping(&[
                (MappingKey::from("male"), 2),
                (MappingKey::from("female"), 0),
            ])),
        )])
        .expect("engine builds");

        assert_eq!(engine.score_field("Sex", &FieldValue::from("male")), 2);
        assert_eq!(engine.score_field("Sex", &FieldValue::from("other")), 0);
        assert_eq!(engine.score_field("Sex", &FieldValue::Missing), 0);
    }

    #[test]
    fn unconfigured_and_empty_fields_score_zero() {
        let engine = RuleEngine::new([("Telephone", FieldRuleSpec::Empty)]).expect("engine builds");

        assert_eq!(engine.score_field("Telephone", &FieldValue::from(1)), 0);
        assert_eq!(engine.score_field("Job", &FieldValue::from(0)), 0);
    }

    #[test]
    fn closures_plug_in_as_named_predicates_and_functions() {
        let engine = RuleEngine::new([
            (
                "Purpose",
                FieldRuleSpec::RangeRules(vec![RangeRule::when(
                    NamedPredicate::new("starts with b", |value: &FieldValue| {
                        value.as_text().is_some_and(|text| text.starts_with('b'))
                    }),
                    10,
                )]),
            ),
            (
                "Job",
                FieldRuleSpec::DefaultWithOverrides {
                    default: Arc::new(NamedScoreFunction::new("double", |value: &FieldValue| {
                        value
                            .as_number()
                            .map(|x| (x * 2.0) as i64)
                            .ok_or_else(|| EvaluationFailure::NotNumeric(value.to_string()))
                    })),
                    specific: mapping(&[(MappingKey::Int(0), 1)]),
                },
            ),
        ])
        .expect("engine builds");

        assert_eq!(engine.score_field("Purpose", &FieldValue::from("business")), 10);
        assert_eq!(engine.score_field("Purpose", &FieldValue::from("car")), 0);
        assert_eq!(engine.score_field("Job", &FieldValue::from(3)), 6);
        assert_eq!(engine.score_field("Job", &FieldValue::from("n/a")), 1);
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let error = RuleEngine::new([("Job", FieldRuleSpec::Empty), ("Job", FieldRuleSpec::Empty)])
            .expect_err("duplicate rejected");
        assert_eq!(error, ConfigurationError::DuplicateField("Job".to_string()));
    }

    #[test]
    fn composed_conditions_follow_boolean_logic() {
        let young_or_old = Condition::Lt(20.0).or(Condition::Gt(70.0));
        assert!(young_or_old.matches(&FieldValue::from(19)));
        assert!(young_or_old.matches(&FieldValue::from(71)));
        assert!(!young_or_old.matches(&FieldValue::from(20)));

        let bracket = Condition::between(20.0, 25.0).or(Condition::above_up_to(60.0, 70.0));
        assert!(bracket.matches(&FieldValue::from(20)));
        assert!(!bracket.matches(&FieldValue::from(25)));
        assert!(bracket.matches(&FieldValue::from(70)));
        assert!(!bracket.matches(&FieldValue::from(60)));

        let not_car = Condition::Not(Box::new(Condition::Eq(MappingKey::from("car"))));
        assert!(not_car.matches(&FieldValue::from("repairs")));
        assert!(!not_car.matches(&FieldValue::from("car")));
    }
}
