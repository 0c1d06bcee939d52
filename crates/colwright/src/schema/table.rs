//! Rectangular datasets of uniquely named columns.

use std::collections::HashSet;

use crate::error::{ColwrightError, Result};

use super::cell::Cell;
use super::column::Column;

/// An ordered set of uniquely named columns of equal length.
///
/// Transformations never mutate a dataset in place; they clone it and
/// return the modified copy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ColwrightError::Validation(format!(
                    "Duplicate column name '{}'",
                    column.name
                )));
            }
            if column.len() != row_count {
                return Err(ColwrightError::Validation(format!(
                    "Column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Build a dataset from headers and row-major cells.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|h| Column::new(h, Vec::with_capacity(rows.len())))
            .collect();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ColwrightError::Validation(format!(
                    "Row {} has {} values, expected {}",
                    row_idx,
                    row.len(),
                    columns.len()
                )));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.cells.push(cell);
            }
        }
        Self::new(columns)
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns true if a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column(column).and_then(|c| c.cells.get(row))
    }

    /// Get a column, or a `ColumnNotFound` error.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| ColwrightError::ColumnNotFound(vec![name.to_string()]))
    }

    /// Fail with every name in `names` that is not a column.
    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| !self.contains(n))
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ColwrightError::ColumnNotFound(missing))
        }
    }

    /// Fail if any of `names` already exists or repeats within `names`.
    pub fn ensure_absent<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let mut seen = HashSet::new();
        for name in names.iter().map(AsRef::as_ref) {
            if self.contains(name) || !seen.insert(name) {
                return Err(ColwrightError::ColumnExists(name.to_string()));
            }
        }
        Ok(())
    }

    /// A copy limited to the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.head(n)).collect(),
            row_count: self.row_count.min(n),
        }
    }

    /// Append a column of matching length with a new name.
    pub(crate) fn push_column(&mut self, column: Column) -> Result<()> {
        if self.contains(&column.name) {
            return Err(ColwrightError::ColumnExists(column.name));
        }
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(ColwrightError::Structural(format!(
                "Column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count
            )));
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        }
        self.columns.push(column);
        Ok(())
    }

    /// Mutable access to a column for in-place replacement of its cells.
    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Rebuild the dataset from a list of source row indices (repeats allowed).
    pub(crate) fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            row_count: indices.len(),
        }
    }
}
