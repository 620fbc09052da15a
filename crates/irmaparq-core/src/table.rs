use std::ops::Range;

use indexmap::IndexMap;

use crate::error::{IngestError, Result};
use crate::value::CellValue;

/// An ordered collection of named, equal-length columns.
///
/// Column names are unique and keep insertion order; that order is the
/// order the resolved schema sees. A table is built by one parser or
/// merger call, mutated only by provenance attachment and kind-specific
/// transforms, then consumed by the writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Vec<CellValue>>,
    rows: usize,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (name, column) pairs, validating that names are
    /// unique and all columns have the same length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<CellValue>)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column on the right
    pub fn push_column<S: Into<String>>(&mut self, name: S, values: Vec<CellValue>) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(IngestError::internal(format!(
                "duplicate column name {:?}",
                name
            )));
        }
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(IngestError::internal(format!(
                "column {:?} has {} rows, table has {}",
                name,
                values.len(),
                self.rows
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Insert a column on the left
    pub fn prepend_column<S: Into<String>>(
        &mut self,
        name: S,
        values: Vec<CellValue>,
    ) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(IngestError::internal(format!(
                "duplicate column name {:?}",
                name
            )));
        }
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(IngestError::internal(format!(
                "column {:?} has {} rows, table has {}",
                name,
                values.len(),
                self.rows
            )));
        }
        self.columns.shift_insert(0, name, values);
        Ok(())
    }

    /// Broadcast a scalar over every row of a column, overwriting the
    /// column in place when it exists and appending it otherwise.
    pub fn set_scalar<S: Into<String>>(&mut self, name: S, value: CellValue) {
        let name = name.into();
        let column = vec![value; self.rows];
        self.columns.insert(name, column);
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the table holds no columns at all
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check for a column by name
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Borrow a column by name
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Column names in table order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// (name, cells) pairs in table order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[CellValue])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Rewrite every cell of one column, stopping at the first failure.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(CellValue) -> Result<CellValue>,
    {
        let column = self
            .columns
            .get_mut(name)
            .ok_or_else(|| IngestError::internal(format!("column {:?} not found", name)))?;
        for cell in column.iter_mut() {
            let taken = std::mem::replace(cell, CellValue::Null);
            *cell = f(taken)?;
        }
        Ok(())
    }

    /// Rewrite every cell of every column
    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(CellValue) -> CellValue,
    {
        for column in self.columns.values_mut() {
            for cell in column.iter_mut() {
                let taken = std::mem::replace(cell, CellValue::Null);
                *cell = f(taken);
            }
        }
    }

    /// Append another table's rows, taking the union of column sets.
    ///
    /// Columns keep this table's order; columns first seen in `other` are
    /// appended on the right. Rows missing a column are null-filled.
    pub fn concat(&mut self, other: Table) {
        let prior_rows = self.rows;
        let added_rows = other.rows;
        for (name, mut values) in other.columns {
            match self.columns.get_mut(&name) {
                Some(column) => column.append(&mut values),
                None => {
                    let mut column = vec![CellValue::Null; prior_rows];
                    column.append(&mut values);
                    self.columns.insert(name, column);
                }
            }
        }
        self.rows = prior_rows + added_rows;
        for column in self.columns.values_mut() {
            column.resize(self.rows, CellValue::Null);
        }
    }

    /// Project to the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let mut out = Table::new();
        for &name in names {
            let values = self
                .columns
                .get(name)
                .ok_or_else(|| IngestError::internal(format!("column {:?} not found", name)))?;
            out.push_column(name, values.clone())?;
        }
        Ok(out)
    }

    /// Rename columns in place, preserving order. Names absent from the
    /// table are ignored.
    pub fn rename(&mut self, mapping: &[(&str, &str)]) -> Result<()> {
        let mut renamed = IndexMap::with_capacity(self.columns.len());
        for (name, values) in self.columns.drain(..) {
            let new_name = mapping
                .iter()
                .find(|(from, _)| *from == name)
                .map(|(_, to)| (*to).to_string())
                .unwrap_or(name);
            if renamed.insert(new_name.clone(), values).is_some() {
                return Err(IngestError::internal(format!(
                    "rename collides on column {:?}",
                    new_name
                )));
            }
        }
        self.columns = renamed;
        Ok(())
    }

    /// Row ranges of at most `size` rows covering the table in order.
    ///
    /// `size` must be non-zero.
    pub fn chunk_ranges(&self, size: usize) -> impl Iterator<Item = Range<usize>> {
        debug_assert!(size > 0);
        let rows = self.rows;
        (0..rows)
            .step_by(size.max(1))
            .map(move |start| start..(start + size).min(rows))
    }
}
