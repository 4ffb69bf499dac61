//! Column-oriented string table parsed from CSV.
//!
//! Cells stay as text until the splitter converts the columns it needs into
//! numbers. Columns are reference counted so that transforms which leave a
//! column alone can share it with their output instead of copying it.

use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

use csv::{ReaderBuilder, Trim};
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// A named column of string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Arc<Vec<String>>,
}

impl Column {
    /// Create a column from owned values.
    pub fn new<S: Into<String>>(name: S, values: Vec<String>) -> Self {
        Column {
            name: name.into(),
            values: Arc::new(values),
        }
    }

    /// Column name as it appeared in the header row.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cells in row order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether both columns point at the same cell storage.
    pub fn shares_storage_with(&self, other: &Column) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

/// An ordered set of equally long columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

/// Shape summary of a table, used by the `dataset` command.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(PipelineError::dataset(format!(
                    "duplicate column '{}'",
                    column.name()
                )));
            }
            if column.len() != n_rows {
                return Err(PipelineError::dataset(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    n_rows
                )));
            }
        }

        Ok(Table { columns, n_rows })
    }

    /// Parse CSV text with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (column, value) in cells.iter_mut().zip(record.iter()) {
                column.push(value.to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name, values))
            .collect();

        Table::new(columns)
    }

    /// Parse CSV from an in-memory string.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_csv_reader(text.as_bytes())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up a column by name, failing with `MissingField` when absent.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| PipelineError::missing_field(name))
    }

    /// Parse every cell of a column as `f64`, ignoring surrounding blanks.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.require_column(name)?;
        column
            .values()
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.trim().parse::<f64>().map_err(|_| {
                    PipelineError::dataset(format!(
                        "column '{name}' row {row}: '{cell}' is not a number"
                    ))
                })
            })
            .collect()
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            row_count: self.n_rows,
            columns: self.column_names().into_iter().map(str::to_string).collect(),
        }
    }
}
