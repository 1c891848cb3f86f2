use super::rules::{Condition, DefaultScore};
use super::schema::{FieldRuleConfig, RangeEntryConfig, RuleConfig, RuleSetConfig};
use super::tiers::RiskTier;
use super::value::MappingKey;
use std::collections::BTreeMap;

/// Canonical rule set for the German Credit dataset.
///
/// Expects `housing`, `saving_accounts` and `checking_account` to be encoded
/// as integers and `sex`/`purpose` to stay textual.
pub fn german_credit_rules() -> RuleSetConfig {
    RuleSetConfig {
        fields: vec![
            field("Age", age_rule()),
            field(
                "Sex",
                mapping([("male", 2), ("female", 0), ("unknown", 1)]),
            ),
            field("Job", int_mapping([(0, 15), (1, 10), (2, 5), (3, 1)])),
            field("Housing", int_mapping([(0, 15), (1, 10), (2, 5)])),
            field("Saving accounts", descending(4.0, 3.0)),
            field("Checking account", descending(3.0, 4.0)),
            field("Credit amount", thresholds([(8000.0, 15), (5000.0, 10), (2000.0, 5)])),
            field("Duration", thresholds([(36.0, 15), (24.0, 10), (12.0, 5)])),
            field(
                "Purpose",
                mapping([
                    ("business", 10),
                    ("education", 10),
                    ("unknown", 8),
                    ("car", 5),
                    ("furniture/equipment", 5),
                    ("radio/TV", 3),
                    ("domestic appliances", 3),
                    ("repairs", 3),
                    ("vacation/others", 3),
                ]),
            ),
        ],
        tiers: vec![
            RiskTier::new(70, "High risk"),
            RiskTier::new(50, "Medium-high risk"),
            RiskTier::new(30, "Medium-low risk"),
            RiskTier::new(0, "Low risk"),
        ],
    }
}

fn age_rule() -> RuleConfig {
    RuleConfig::Range {
        entries: vec![
            RangeEntryConfig::when(Condition::Lt(20.0).or(Condition::Gt(70.0)), 15),
            RangeEntryConfig::when(
                Condition::between(20.0, 25.0).or(Condition::above_up_to(60.0, 70.0)),
                10,
            ),
            RangeEntryConfig::when(
                Condition::between(25.0, 30.0).or(Condition::above_up_to(50.0, 60.0)),
                5,
            ),
        ],
    }
}

fn field(name: &str, rule: RuleConfig) -> FieldRuleConfig {
    FieldRuleConfig {
        field: name.to_string(),
        rule,
    }
}

fn mapping<const N: usize>(values: [(&str, i64); N]) -> RuleConfig {
    RuleConfig::Mapping {
        values: values
            .into_iter()
            .map(|(key, score)| (MappingKey::from(key), score))
            .collect(),
    }
}

fn int_mapping<const N: usize>(values: [(i64, i64); N]) -> RuleConfig {
    RuleConfig::Mapping {
        values: values
            .into_iter()
            .map(|(key, score)| (MappingKey::Int(key), score))
            .collect(),
    }
}

fn descending(ceiling: f64, step: f64) -> RuleConfig {
    RuleConfig::DefaultWithOverrides {
        default: DefaultScore::Descending {
            ceiling,
            step,
            otherwise: 10,
        },
        specific: BTreeMap::from([(MappingKey::Int(0), 10)]),
    }
}

fn thresholds<const N: usize>(entries: [(f64, i64); N]) -> RuleConfig {
    RuleConfig::Range {
        entries: entries
            .into_iter()
            .map(|(threshold, score)| RangeEntryConfig::above(threshold, score))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{CustomerRecord, FieldValue, RiskScorer};

    fn scorer() -> RiskScorer {
        german_credit_rules().build().expect("canonical rules build")
    }

    fn reference_customer() -> CustomerRecord {
        CustomerRecord::new()
            .with("age", 45)
            .with("sex", "male")
            .with("job", 2)
            .with("housing", 2)
            .with("saving_accounts", 1)
            .with("checking_account", 1)
            .with("credit_amount", 3000)
            .with("duration", 18)
            .with("purpose", "car")
    }

    #[test]
    fn reference_customer_scores_forty_four() {
        let scorer = scorer();
        let breakdown = scorer
            .breakdown(&reference_customer())
            .expect("breakdown builds");
        let scores: Vec<(&str, i64)> = breakdown
            .iter()
            .map(|component| (component.field.as_str(), component.score))
            .collect();

        assert_eq!(
            scores,
            vec![
                ("Age", 0),
                ("Sex", 2),
                ("Job", 5),
                ("Housing", 5),
                ("Saving accounts", 9),
                ("Checking account", 8),
                ("Credit amount", 5),
                ("Duration", 5),
                ("Purpose", 5),
            ]
        );

        let total = scorer
            .score_record(&reference_customer())
            .expect("record scores");
        assert_eq!(total, 44);
        assert_eq!(scorer.classify(total), Ok("Medium-low risk"));
    }

    #[test]
    fn age_brackets_cover_both_tails() {
        let scorer = scorer();
        let engine = scorer.engine();
        let cases = [
            (19, 15),
            (71, 15),
            (20, 10),
            (24, 10),
            (61, 10),
            (70, 10),
            (25, 5),
            (29, 5),
            (51, 5),
            (60, 5),
            (30, 0),
            (50, 0),
        ];

        for (age, expected) in cases {
            assert_eq!(
                engine.score_field("Age", &FieldValue::from(age)),
                expected,
                "age {age}"
            );
        }
    }

    #[test]
    fn riskiest_profile_reaches_high_tier() {
        let scorer = scorer();
        let record = CustomerRecord::new()
            .with("age", 19)
            .with("sex", "male")
            .with("job", 0)
            .with("housing", 0)
            .with("saving_accounts", 0)
            .with("checking_account", 0)
            .with("credit_amount", 9000)
            .with("duration", 48)
            .with("purpose", "business");

        let total = scorer.score_record(&record).expect("record scores");
        assert_eq!(total, 100);
        assert_eq!(scorer.classify(total), Ok("High risk"));
    }

    #[test]
    fn canonical_rules_render_as_json() {
        let rendered = german_credit_rules().to_json_pretty().expect("renders");
        let parsed = RuleSetConfig::from_json_str(&rendered).expect("parses back");
        assert_eq!(parsed, german_credit_rules());
    }
}
