use super::loader::Dataset;
use crate::normalizer::normalize_field_name;
use crate::scoring::{FieldValue, MappingKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Value-to-code mapping for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnEncoding {
    pub column: String,
    pub values: BTreeMap<MappingKey, i64>,
}

impl ColumnEncoding {
    pub fn new<const N: usize>(column: &str, values: [(&str, i64); N]) -> Self {
        Self {
            column: column.to_string(),
            values: values
                .into_iter()
                .map(|(value, code)| (MappingKey::from(value), code))
                .collect(),
        }
    }
}

/// Replaces categorical values with their integer codes.
///
/// Values without a code become missing; returns the unmapped count per column.
pub fn encode_dataset(dataset: &mut Dataset, encodings: &[ColumnEncoding]) -> Vec<(String, usize)> {
    let mut unmapped_counts = Vec::new();

    for encoding in encodings {
        let column = normalize_field_name(&encoding.column);
        if !dataset.has_column(&column) {
            continue;
        }

        let mut unmapped = 0;
        for value in dataset.values_mut(&column) {
            let code = value
                .mapping_key()
                .and_then(|key| encoding.values.get(&key).copied());
            *value = match code {
                Some(code) => FieldValue::from(code),
                None => {
                    unmapped += 1;
                    FieldValue::Missing
                }
            };
        }

        if unmapped > 0 {
            warn!(%column, unmapped, "values without an encoding were set to missing");
        }
        unmapped_counts.push((column, unmapped));
    }

    unmapped_counts
}
