use super::error::PipelineError;
use super::loader::Dataset;
use crate::scoring::RiskReport;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn write_report<W: Write>(report: &RiskReport, writer: W) -> Result<(), PipelineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let columns = report.columns();
    csv_writer.write_record(&columns)?;
    for row in report.rows() {
        csv_writer.write_record(report.cells(&columns, row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the enriched report to a `.csv` path, creating parent directories.
pub fn save_report<P: AsRef<Path>>(report: &RiskReport, path: P) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let file = create_csv_file(path)?;
    write_report(report, file)?;
    info!(path = %path.display(), rows = report.len(), "risk report saved");
    Ok(())
}

pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W) -> Result<(), PipelineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&dataset.columns)?;
    for record in &dataset.records {
        csv_writer.write_record(dataset.columns.iter().map(|column| {
            record
                .get(column)
                .map(ToString::to_string)
                .unwrap_or_default()
        }))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Persists the cleaned and encoded dataset before scoring.
pub fn save_dataset<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let file = create_csv_file(path)?;
    write_dataset(dataset, file)?;
    info!(path = %path.display(), rows = dataset.len(), "processed dataset saved");
    Ok(())
}

/// True when the path carries a `.csv` extension, in any case.
pub fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn ensure_csv_path(path: &Path) -> Result<(), PipelineError> {
    if is_csv_path(path) {
        Ok(())
    } else {
        Err(PipelineError::InvalidOutputPath(path.to_path_buf()))
    }
}

fn create_csv_file(path: &Path) -> Result<std::fs::File, PipelineError> {
    ensure_csv_path(path)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(std::fs::File::create(path)?)
}
