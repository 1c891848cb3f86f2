use super::error::PipelineError;
use super::loader::Dataset;
use crate::normalizer::normalize_field_name;
use crate::scoring::FieldValue;
use tracing::{debug, info};

/// Fill value for missing categorical cells.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Counts of cells changed per column while cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningSummary {
    pub filled_categorical: Vec<(String, usize)>,
    pub imputed_numerical: Vec<(String, usize, f64)>,
}

/// Fills missing categorical cells with `"unknown"` and numerical cells with the column median.
///
/// Non-numeric text in a numerical column counts as missing. Columns absent
/// from the dataset are skipped.
pub fn clean_dataset<S: AsRef<str>>(
    dataset: &mut Dataset,
    categorical: &[S],
    numerical: &[S],
) -> Result<CleaningSummary, PipelineError> {
    let mut summary = CleaningSummary::default();

    for column in categorical.iter().map(|c| normalize_field_name(c.as_ref())) {
        if !dataset.has_column(&column) {
            debug!(%column, "categorical column not present, skipping");
            continue;
        }

        let mut filled = 0;
        for value in dataset.values_mut(&column) {
            if value.is_missing() {
                *value = FieldValue::Text(UNKNOWN_CATEGORY.to_string());
                filled += 1;
            }
        }
        summary.filled_categorical.push((column, filled));
    }

    for column in numerical.iter().map(|c| normalize_field_name(c.as_ref())) {
        if !dataset.has_column(&column) {
            debug!(%column, "numerical column not present, skipping");
            continue;
        }

        let mut numbers: Vec<f64> = dataset
            .values_mut(&column)
            .filter_map(|value| value.as_number())
            .collect();
        let fill = median(&mut numbers).ok_or_else(|| PipelineError::NoNumericValues(column.clone()))?;

        let mut imputed = 0;
        for value in dataset.values_mut(&column) {
            if value.as_number().is_none() {
                *value = FieldValue::Number(fill);
                imputed += 1;
            }
        }
        summary.imputed_numerical.push((column, imputed, fill));
    }

    info!(
        categorical = summary.filled_categorical.len(),
        numerical = summary.imputed_numerical.len(),
        "dataset cleaned"
    );
    Ok(summary)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
