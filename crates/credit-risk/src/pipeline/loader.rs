use super::error::PipelineError;
use crate::normalizer::normalize_field_name;
use crate::scoring::{CustomerRecord, FieldValue};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Cells treated as missing in addition to empty strings (pandas' default NA set).
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Loaded table: normalized column names plus one record per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<CustomerRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    pub(crate) fn values_mut<'a>(
        &'a mut self,
        column: &'a str,
    ) -> impl Iterator<Item = &'a mut FieldValue> + 'a {
        self.records
            .iter_mut()
            .filter_map(move |record| record.get_mut(column))
    }
}

pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Dataset, PipelineError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let dataset = load_reader(file)?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns.len(),
        "loaded credit dataset"
    );
    Ok(dataset)
}

/// Reads CSV, drops a leading unnamed index column and normalizes headers.
pub fn load_reader<R: Read>(reader: R) -> Result<Dataset, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let skip_index = headers.get(0).is_some_and(is_index_header);
    let columns: Vec<String> = headers
        .iter()
        .skip(usize::from(skip_index))
        .map(normalize_field_name)
        .collect();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let record = columns
            .iter()
            .zip(row.iter().skip(usize::from(skip_index)))
            .map(|(column, cell)| (column.as_str(), parse_cell(cell)))
            .collect::<CustomerRecord>();
        records.push(record);
    }

    if records.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    Ok(Dataset { columns, records })
}

fn is_index_header(header: &str) -> bool {
    let header = header.trim_start_matches('\u{feff}').trim();
    header.is_empty() || header.starts_with("Unnamed")
}

fn parse_cell(cell: &str) -> FieldValue {
    if MISSING_MARKERS.contains(&cell) {
        return FieldValue::Missing;
    }
    FieldValue::parse(cell)
}
