use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::DataError;

/// Cell tokens treated as missing values
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Values of a single column, stored with the scalar type inferred at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnValues {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    /// Infers the narrowest scalar type that fits every non-missing cell
    fn infer(cells: Vec<Option<String>>) -> Self {
        let present = || cells.iter().flatten();

        if present().next().is_none() {
            return ColumnValues::Float(vec![None; cells.len()]);
        }

        if present().all(|c| c.parse::<i64>().is_ok()) {
            return ColumnValues::Integer(
                cells
                    .iter()
                    .map(|c| c.as_ref().and_then(|v| v.parse().ok()))
                    .collect(),
            );
        }

        if present().all(|c| parse_finite(c).is_some()) {
            return ColumnValues::Float(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(parse_finite))
                    .collect(),
            );
        }

        if present().all(|c| parse_bool(c).is_some()) {
            return ColumnValues::Boolean(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(parse_bool))
                    .collect(),
            );
        }

        ColumnValues::Text(cells)
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValues::Integer(_) => "integer",
            ColumnValues::Float(_) => "float",
            ColumnValues::Boolean(_) => "boolean",
            ColumnValues::Text(_) => "text",
        }
    }

    /// True for integer and float columns
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValues::Integer(_) | ColumnValues::Float(_))
    }

    /// Cells rendered as strings, used for categorical summaries
    pub fn display_cells(&self) -> Vec<Option<String>> {
        match self {
            ColumnValues::Integer(v) => v.iter().map(|c| c.map(|x| x.to_string())).collect(),
            ColumnValues::Float(v) => v.iter().map(|c| c.map(|x| x.to_string())).collect(),
            ColumnValues::Boolean(v) => v.iter().map(|c| c.map(|x| x.to_string())).collect(),
            ColumnValues::Text(v) => v.clone(),
        }
    }
}

fn parse_finite(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub data: ColumnValues,
}

/// An immutable, column-typed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Builds a dataset, rejecting columns of unequal length
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        if let Some(first) = columns.first() {
            let expected = first.data.len();
            if let Some(bad) = columns.iter().find(|c| c.data.len() != expected) {
                return Err(DataError::RaggedColumns {
                    column: bad.name.clone(),
                    found: bad.data.len(),
                    expected,
                });
            }
        }
        Ok(Self { columns })
    }

    /// Reads a delimited file with a header row.
    ///
    /// `.tsv` files are tab separated, everything else is comma separated.
    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, delimiter_for(path), path)
    }

    /// Parses delimited text from any reader; `source` is only used in error messages
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, source: &Path) -> Result<Self, DataError> {
        let parse_error = |message: String| DataError::Parse {
            path: source.to_path_buf(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| parse_error(e.to_string()))?
            .clone();

        if headers.is_empty() {
            return Err(parse_error("no header row".to_string()));
        }

        let names = dedupe_headers(headers.iter());
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];

        for record in reader.records() {
            let record = record.map_err(|e| parse_error(e.to_string()))?;
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(if MISSING_TOKENS.contains(&field) {
                    None
                } else {
                    Some(field.to_string())
                });
            }
        }

        let columns: Vec<Column> = names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column {
                name,
                data: ColumnValues::infer(values),
            })
            .collect();

        let dataset = Self::new(columns)?;
        debug!(
            path = %source.display(),
            columns = dataset.columns.len(),
            rows = dataset.num_rows(),
            "Parsed delimited file"
        );
        Ok(dataset)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    /// Numeric view of a column. Booleans map to 0/1, text is rejected.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, DataError> {
        let column = self
            .column(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;

        match &column.data {
            ColumnValues::Integer(v) => Ok(v.iter().map(|c| c.map(|x| x as f64)).collect()),
            ColumnValues::Float(v) => Ok(v.clone()),
            ColumnValues::Boolean(v) => Ok(v
                .iter()
                .map(|c| c.map(|b| if b { 1.0 } else { 0.0 }))
                .collect()),
            ColumnValues::Text(_) => Err(DataError::NonNumericColumn(name.to_string())),
        }
    }

    /// Numeric view of a column that must not contain missing cells
    pub fn dense_numeric_column(&self, name: &str) -> Result<Vec<f64>, DataError> {
        self.numeric_column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.ok_or_else(|| DataError::MissingValue {
                    column: name.to_string(),
                    row,
                })
            })
            .collect()
    }
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Repeated header names get a `.N` suffix so every column stays addressable
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .map(|h| {
            let count = seen.entry(h.to_string()).or_insert(0);
            let name = if *count == 0 {
                h.to_string()
            } else {
                format!("{}.{}", h, count)
            };
            *count += 1;
            name
        })
        .collect()
}
