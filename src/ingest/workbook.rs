use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use log::warn;
use rayon::prelude::*;

use crate::ingest::raw::{RawRecord, RawValue};
use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

/// Rows read from one workbook, all sheets concatenated in sheet order.
#[derive(Debug, Clone)]
pub struct WorkbookRead {
    pub path: PathBuf,
    pub sheets: usize,
    pub records: Vec<RawRecord>,
}

/// A workbook that could not be read and was left out of the run.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Output of reading every discovered workbook.
#[derive(Debug, Default)]
pub struct ReadBatch {
    pub workbooks: Vec<WorkbookRead>,
    pub skipped: Vec<SkippedFile>,
}

impl ReadBatch {
    pub fn rows_read(&self) -> usize {
        self.workbooks.iter().map(|wb| wb.records.len()).sum()
    }

    /// All rows in discovery order. Consumes the batch.
    pub fn into_records(self) -> impl Iterator<Item = RawRecord> {
        self.workbooks.into_iter().flat_map(|wb| wb.records)
    }
}

fn cell_value(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| RawValue::Text(trimmed.to_string()))
        }
        Data::Float(value) => Some(RawValue::Number(*value)),
        Data::Int(value) => Some(RawValue::Number(*value as f64)),
        Data::Bool(value) => Some(RawValue::Text(value.to_string())),
        Data::DateTime(value) => Some(RawValue::Number(value.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(RawValue::Text(text.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}

fn header_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        other => other.to_string(),
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// First row is the header; every later row with at least one value becomes a
/// record. Columns without a header are ignored.
pub fn sheet_records(range: &Range<Data>) -> Vec<RawRecord> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<Option<String>> = header_row.iter().map(header_text).collect();

    rows.filter_map(|row| {
        let mut record = RawRecord::new();
        for (header, cell) in headers.iter().zip(row) {
            if let (Some(header), Some(value)) = (header, cell_value(cell)) {
                record.push(header.clone(), value);
            }
        }
        (!record.is_empty()).then_some(record)
    })
    .collect()
}

pub fn read_workbook(path: &Path) -> Result<WorkbookRead> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;

    let mut records = Vec::new();
    let sheet_names = workbook.sheet_names();
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("failed to read sheet '{name}' in {}", path.display()))?;
        let rows = sheet_records(&range);
        log_debug!("{} [{}]: {} row(s)", path.display(), name, rows.len());
        records.extend(rows);
    }

    Ok(WorkbookRead {
        path: path.to_path_buf(),
        sheets: sheet_names.len(),
        records,
    })
}

/// Read every workbook, optionally in parallel. A file that fails to read is
/// reported in [`ReadBatch::skipped`] and never aborts the batch; results keep
/// the order of `paths` either way.
pub fn read_workbooks(paths: &[PathBuf], parallel: bool) -> ReadBatch {
    let results: Vec<(PathBuf, Result<WorkbookRead>)> = if parallel {
        paths
            .par_iter()
            .map(|path| (path.clone(), read_workbook(path)))
            .collect()
    } else {
        paths
            .iter()
            .map(|path| (path.clone(), read_workbook(path)))
            .collect()
    };

    let mut batch = ReadBatch::default();
    for (path, result) in results {
        match result {
            Ok(workbook) => {
                log_info!(
                    "Read {} row(s) from {} sheet(s) in {}",
                    workbook.records.len(),
                    workbook.sheets,
                    path.display()
                );
                batch.workbooks.push(workbook);
            }
            Err(err) => {
                warn!("Skipping {}: {err:#}", path.display());
                batch.skipped.push(SkippedFile {
                    path,
                    reason: format!("{err:#}"),
                });
            }
        }
    }
    batch
}
