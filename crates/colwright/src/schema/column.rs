//! Named columns of cells.

use super::cell::Cell;
use super::types::{SemanticType, Storage};

/// A named, ordered sequence of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within a dataset.
    pub name: String,
    /// Cell values, one per row.
    pub cells: Vec<Cell>,
    /// Category list for categorical storage.
    categories: Option<Vec<String>>,
    /// Caller-assigned semantic type, overriding inference.
    semantic_override: Option<SemanticType>,
}

impl Column {
    /// Create a column from a name and cells.
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
            categories: None,
            semantic_override: None,
        }
    }

    /// Create a column from anything convertible into cells.
    pub fn from_values<T: Into<Cell>>(name: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self::new(name, values.into_iter().map(Into::into).collect())
    }

    /// Assign a semantic type that takes precedence over inference.
    pub fn with_semantic_type(mut self, semantic_type: SemanticType) -> Self {
        self.semantic_override = Some(semantic_type);
        self
    }

    /// The caller-assigned semantic type, if any.
    pub fn semantic_override(&self) -> Option<SemanticType> {
        self.semantic_override
    }

    /// Category list when the column is stored as categorical.
    pub fn categories(&self) -> Option<&[String]> {
        self.categories.as_deref()
    }

    /// Store as categorical, with the sorted distinct non-null display values
    /// as categories.
    pub(crate) fn mark_categorical(&mut self) {
        let mut categories: Vec<String> = self
            .cells
            .iter()
            .filter(|c| !c.is_null())
            .map(|c| c.to_string())
            .collect();
        categories.sort();
        categories.dedup();
        self.categories = Some(categories);
    }

    /// Drop the category list, if any.
    pub(crate) fn clear_categories(&mut self) {
        self.categories = None;
    }

    /// Forget the caller-assigned semantic type.
    pub(crate) fn clear_semantic_override(&mut self) {
        self.semantic_override = None;
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of missing cells.
    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }

    /// Iterate over non-missing cells.
    pub fn non_null(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.is_null())
    }

    /// The first non-missing cell.
    pub fn first_non_null(&self) -> Option<&Cell> {
        self.non_null().next()
    }

    /// Returns true if every cell is missing.
    pub fn is_all_null(&self) -> bool {
        self.first_non_null().is_none()
    }

    /// Physical storage derived from the cells.
    pub fn storage(&self) -> Storage {
        if self.categories.is_some() {
            return Storage::Categorical;
        }

        let mut storage: Option<Storage> = None;
        for cell in self.non_null() {
            let kind = match cell {
                Cell::Boolean(_) => Storage::Boolean,
                Cell::Integer(_) => Storage::Integer,
                Cell::Float(_) => Storage::Float,
                Cell::DateTime(_) => Storage::DateTime,
                Cell::Date(_) => Storage::Date,
                Cell::Time(_) => Storage::Time,
                _ => return Storage::Generic,
            };
            storage = match (storage, kind) {
                (None, k) => Some(k),
                (Some(a), b) if a == b => Some(a),
                (Some(Storage::Integer), Storage::Float) | (Some(Storage::Float), Storage::Integer) => {
                    Some(Storage::Float)
                }
                _ => return Storage::Generic,
            };
        }
        storage.unwrap_or(Storage::Generic)
    }

    /// A copy limited to the first `n` cells.
    pub fn head(&self, n: usize) -> Self {
        Self {
            name: self.name.clone(),
            cells: self.cells.iter().take(n).cloned().collect(),
            categories: self.categories.clone(),
            semantic_override: self.semantic_override,
        }
    }

    /// A copy with cells picked by row index (indices may repeat).
    pub(crate) fn take(&self, indices: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            cells: indices.iter().map(|&i| self.cells[i].clone()).collect(),
            categories: self.categories.clone(),
            semantic_override: self.semantic_override,
        }
    }
}
