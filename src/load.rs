use std::io::Cursor;
use std::ops::Deref;

use polars::frame::DataFrame;
use polars::prelude::{CsvReader, DataType, SerReader, Series};
use tracing::debug;

use crate::error::{DashboardError, Result};

/// A parsed CSV resource, remembering where it came from for error messages.
#[derive(Debug)]
pub struct DataSet {
    frame: DataFrame,
    source_name: String,
}

impl Deref for DataSet {
    type Target = DataFrame;

    fn deref(&self) -> &Self::Target {
        &self.frame
    }
}

/// Parse CSV text with a header row, inferring column types from the whole file.
pub fn load_csv(source_name: &str, data: String) -> Result<DataSet> {
    if data.trim().is_empty() {
        return Err(DashboardError::malformed(source_name, "empty resource"));
    }
    let frame = CsvReader::new(Cursor::new(data))
        .has_header(true)
        .infer_schema(None)
        .finish()
        .map_err(|e| DashboardError::malformed(source_name, e))?;
    debug!(source = source_name, rows = frame.height(), columns = frame.width(), "parsed csv");
    Ok(DataSet {
        frame,
        source_name: source_name.to_string(),
    })
}

// the WHO export starts with a byte-order mark
fn normalize(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}

// float columns come back as "9000000.0"
fn parse_count(text: &str) -> Option<i64> {
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let v: f64 = text.parse().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

impl DataSet {
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Actual column name matching `wanted`, ignoring case, BOM and padding.
    pub fn resolve(&self, wanted: &str) -> Option<&str> {
        self.frame
            .get_column_names()
            .into_iter()
            .find(|name| normalize(name).eq_ignore_ascii_case(wanted))
    }

    /// Fail with every missing column listed, not just the first.
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| self.resolve(c).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(self.malformed(format!("missing columns: {}", missing.join(", "))))
        }
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.cast(name, &DataType::Utf8)?;
        let values = series
            .utf8()
            .map_err(|e| self.malformed(e))?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Whole-number column. Empty cells are `None`, anything else that is not
    /// an integer fails the load.
    pub fn int_column(&self, name: &str) -> Result<Vec<Option<i64>>> {
        self.text_column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| match cell.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => parse_count(text)
                    .map(Some)
                    .ok_or_else(|| self.malformed(format!("row {}: invalid {}", row + 1, name))),
            })
            .collect()
    }

    pub fn optional_text_column(&self, name: &str) -> Result<Option<Vec<Option<String>>>> {
        match self.resolve(name) {
            Some(_) => self.text_column(name).map(Some),
            None => Ok(None),
        }
    }

    pub fn optional_int_column(&self, name: &str) -> Result<Option<Vec<Option<i64>>>> {
        match self.resolve(name) {
            Some(_) => self.int_column(name).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn malformed(&self, reason: impl ToString) -> DashboardError {
        DashboardError::malformed(self.source_name.as_str(), reason)
    }

    fn cast(&self, name: &str, dtype: &DataType) -> Result<Series> {
        let column = self
            .resolve(name)
            .ok_or_else(|| self.malformed(format!("missing column: {}", name)))?;
        self.frame
            .column(column)
            .and_then(|s| s.cast_with_dtype(dtype))
            .map_err(|e| self.malformed(format!("column {}: {}", name, e)))
    }
}
