//! Ordered table of typed rows

use super::value::{Value, ValueKind};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// An ordered table of records sharing one column set
///
/// Every row holds exactly one cell per column. The shape is checked on
/// every constructor and column operation, so a `Dataset` value is always
/// rectangular.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create a dataset with the given columns and no rows
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// A dataset with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a dataset from columns and rows, checking row widths
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let mut dataset = Self::new(columns);
        let mut seen = HashSet::new();
        if let Some(dup) = dataset.columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(Error::dataset(format!("Duplicate column '{dup}'")));
        }
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::dataset(format!(
                "Row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the dataset holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the cells of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Get one cell by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Number of null cells in a column (0 for an absent column)
    pub fn null_count(&self, column: &str) -> usize {
        self.column(column)
            .map_or(0, |values| values.filter(|v| v.is_null()).count())
    }

    /// Distinct non-null kinds present in a column
    pub fn column_kinds(&self, column: &str) -> Vec<ValueKind> {
        let mut kinds = Vec::new();
        if let Some(values) = self.column(column) {
            for value in values {
                let kind = value.kind();
                if kind != ValueKind::Null && !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        kinds
    }

    /// Apply `f` to every cell of a column. Absent columns are left alone.
    #[must_use]
    pub fn map_column(mut self, column: &str, mut f: impl FnMut(Value) -> Value) -> Self {
        if let Some(idx) = self.column_index(column) {
            for row in &mut self.rows {
                let cell = std::mem::take(&mut row[idx]);
                row[idx] = f(cell);
            }
        }
        self
    }

    /// Replace a column's values, or append it if it does not exist yet
    pub fn with_column(mut self, column: &str, values: Vec<Value>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(Error::dataset(format!(
                "Column '{column}' has {} values, dataset has {} rows",
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(column) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(column.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(self)
    }

    /// Apply `f` to every cell
    #[must_use]
    pub fn map_values(mut self, mut f: impl FnMut(Value) -> Value) -> Self {
        for cell in self.rows.iter_mut().flatten() {
            *cell = f(std::mem::take(cell));
        }
        self
    }

    /// Keep the rows for which `keep` returns true, preserving order
    #[must_use]
    pub fn retain_rows(mut self, mut keep: impl FnMut(&[Value]) -> bool) -> Self {
        self.rows.retain(|row| keep(row));
        self
    }

    /// Consume the dataset, returning its columns and rows
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}
