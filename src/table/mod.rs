//! Read interface over typed tables.
//!
//! A [`Table`] is an ordered list of named columns sharing one height. Columns
//! are either numeric or categorical (dictionary encoded) and may carry a
//! [`ColumnRole`]. Columns without a role are the features.

pub mod builder;
pub mod column;
pub mod dictionary;
pub mod splitter;

pub use builder::TableBuilder;
pub use column::{Column, ColumnData};
pub use dictionary::{BooleanCodes, Dictionary};
pub use splitter::TableSplitter;

use crate::core::error::{Result, XgbTableError};
use crate::core::types::{CategoryCode, ColumnKind, ColumnRole};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

/// Ordered collection of equally long columns.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// Create a table, validating heights, names and roles.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);

        let mut names = HashSet::new();
        for column in &columns {
            if column.len() != height {
                return Err(XgbTableError::contract(format!(
                    "Column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    height
                )));
            }
            if !names.insert(column.name()) {
                return Err(XgbTableError::contract(format!(
                    "Duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        for role in [ColumnRole::Label, ColumnRole::Weight] {
            let count = columns.iter().filter(|c| c.role() == Some(role)).count();
            if count > 1 {
                return Err(XgbTableError::contract(format!(
                    "Table has {} {} columns, at most one is supported",
                    count, role
                )));
            }
        }

        Ok(Table { columns, height })
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// All columns in table order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// The column with the given role, if any.
    pub fn column_with_role(&self, role: ColumnRole) -> Option<&Column> {
        self.columns.iter().find(|c| c.role() == Some(role))
    }

    /// The label column, if any.
    pub fn label(&self) -> Option<&Column> {
        self.column_with_role(ColumnRole::Label)
    }

    /// The weight column, if any.
    pub fn weight(&self) -> Option<&Column> {
        self.column_with_role(ColumnRole::Weight)
    }

    /// Columns without a role, in table order.
    pub fn features(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|c| c.role().is_none())
    }

    /// Names of the feature columns, in table order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features().map(|c| c.name().to_string()).collect()
    }

    /// New table made of the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Table> {
        if let Some(&row) = rows.iter().find(|&&row| row >= self.height) {
            return Err(XgbTableError::contract(format!(
                "Row index {} out of bounds for table of height {}",
                row, self.height
            )));
        }
        Ok(Table {
            columns: self.columns.iter().map(|c| c.select_rows(rows)).collect(),
            height: rows.len(),
        })
    }

    /// New table made of a contiguous row range.
    pub fn rows(&self, range: Range<usize>) -> Result<Table> {
        let rows: Vec<usize> = range.collect();
        self.select_rows(&rows)
    }

    /// New table keeping the rows whose code in the named categorical column
    /// satisfies the predicate. Dictionaries are kept unchanged.
    pub fn filter_categorical<F>(&self, name: &str, predicate: F) -> Result<Table>
    where
        F: Fn(CategoryCode) -> bool,
    {
        let codes = self
            .column(name)
            .and_then(Column::codes)
            .ok_or_else(|| {
                XgbTableError::contract(format!("No categorical column named '{}'", name))
            })?;
        let rows: Vec<usize> = codes
            .iter()
            .enumerate()
            .filter(|(_, &code)| predicate(code))
            .map(|(row, _)| row)
            .collect();
        self.select_rows(&rows)
    }

    /// Table of the named columns, in the given order and stripped of roles.
    pub fn project(&self, names: &[String]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| {
                let mut column = self
                    .column(name)
                    .cloned()
                    .ok_or_else(|| XgbTableError::contract(format!("Missing column '{}'", name)))?;
                column.set_role(None);
                Ok(column)
            })
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// Copy of this table aligned with `reference`.
    ///
    /// Columns follow the order of `reference` and categorical columns are
    /// re-encoded over the dictionaries of the matching reference columns.
    pub fn adapt_like(&self, reference: &Table) -> Table {
        let reordered = self.reorder_like(reference);
        let columns = reordered
            .columns
            .iter()
            .map(|column| {
                let target = reference.column(column.name()).and_then(Column::dictionary);
                match (column.dictionary(), target) {
                    (Some(own), Some(target)) if !Arc::ptr_eq(own, target) => column.remap(target),
                    _ => column.clone(),
                }
            })
            .collect();
        Table {
            columns,
            height: self.height,
        }
    }

    /// Same feature names and kinds as `other`, ignoring column order.
    pub fn has_compatible_features(&self, other: &Table) -> bool {
        let signature = |table: &Table| -> HashSet<(String, ColumnKind)> {
            table
                .features()
                .map(|c| (c.name().to_string(), c.kind()))
                .collect()
        };
        signature(self) == signature(other)
    }

    /// Columns of this table in the column order of `reference`.
    ///
    /// Columns unknown to `reference` are appended in their current order.
    pub fn reorder_like(&self, reference: &Table) -> Table {
        let mut columns: Vec<Column> = reference
            .columns
            .iter()
            .filter_map(|c| self.column(c.name()).cloned())
            .collect();
        columns.extend(
            self.columns
                .iter()
                .filter(|c| reference.column(c.name()).is_none())
                .cloned(),
        );
        Table {
            columns,
            height: self.height,
        }
    }
}
