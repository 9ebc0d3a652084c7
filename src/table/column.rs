//! Typed table columns.

use crate::core::error::{Result, XgbTableError};
use crate::core::types::{CategoryCode, ColumnKind, ColumnRole, MISSING_CODE};
use crate::table::Dictionary;
use std::sync::Arc;

/// Column storage.
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Real values, NaN for missing
    Numeric(Vec<f64>),
    /// Dictionary codes, 0 for missing
    Categorical {
        /// Per-row codes
        codes: Vec<CategoryCode>,
        /// Shared dictionary; identity matters for downstream comparisons
        dictionary: Arc<Dictionary>,
    },
}

/// Named, optionally role-tagged column.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    role: Option<ColumnRole>,
    data: ColumnData,
}

impl Column {
    /// Create a numeric column.
    pub fn numeric<S: Into<String>>(name: S, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            role: None,
            data: ColumnData::Numeric(values),
        }
    }

    /// Create a categorical column over an existing dictionary.
    ///
    /// Every non-missing code must refer to a realized dictionary entry.
    pub fn categorical<S: Into<String>>(
        name: S,
        codes: Vec<CategoryCode>,
        dictionary: Arc<Dictionary>,
    ) -> Result<Self> {
        let name = name.into();
        if let Some(&code) = codes
            .iter()
            .find(|&&code| code != MISSING_CODE && dictionary.get(code).is_none())
        {
            return Err(XgbTableError::contract(format!(
                "Column '{}' references code {} which has no dictionary entry",
                name, code
            )));
        }
        Ok(Column {
            name,
            role: None,
            data: ColumnData::Categorical { codes, dictionary },
        })
    }

    /// Attach a role to this column.
    pub fn with_role(mut self, role: ColumnRole) -> Self {
        self.role = Some(role);
        self
    }

    pub(crate) fn set_role(&mut self, role: Option<ColumnRole>) {
        self.role = role;
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column role, `None` for features
    pub fn role(&self) -> Option<ColumnRole> {
        self.role
    }

    /// Column storage
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Column type category
    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical { .. } => ColumnKind::Categorical,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
        }
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of a numeric column
    pub fn numeric_values(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Categorical { .. } => None,
        }
    }

    /// Codes of a categorical column
    pub fn codes(&self) -> Option<&[CategoryCode]> {
        match &self.data {
            ColumnData::Numeric(_) => None,
            ColumnData::Categorical { codes, .. } => Some(codes),
        }
    }

    /// Dictionary of a categorical column
    pub fn dictionary(&self) -> Option<&Arc<Dictionary>> {
        match &self.data {
            ColumnData::Numeric(_) => None,
            ColumnData::Categorical { dictionary, .. } => Some(dictionary),
        }
    }

    /// Label of a categorical row, `None` if missing or numeric.
    pub fn value(&self, row: usize) -> Option<&str> {
        match &self.data {
            ColumnData::Numeric(_) => None,
            ColumnData::Categorical { codes, dictionary } => {
                codes.get(row).and_then(|&code| dictionary.get(code))
            }
        }
    }

    /// Categorical column with at most two realized classes.
    pub fn is_at_most_bicategorical(&self) -> bool {
        self.dictionary()
            .is_some_and(|dictionary| dictionary.is_at_most_bicategorical())
    }

    /// Whether both columns point to the very same dictionary instance.
    pub fn shares_dictionary(&self, other: &Column) -> bool {
        match (self.dictionary(), other.dictionary()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Copy of a categorical column re-encoded over another dictionary.
    ///
    /// Values the target dictionary does not know become missing. Numeric
    /// columns are returned unchanged.
    pub fn remap(&self, target: &Arc<Dictionary>) -> Column {
        let data = match &self.data {
            ColumnData::Numeric(_) => self.data.clone(),
            ColumnData::Categorical { codes, dictionary } => {
                let inverse = target.inverse();
                let codes = codes
                    .iter()
                    .map(|&code| {
                        dictionary
                            .get(code)
                            .and_then(|value| inverse.get(value).copied())
                            .unwrap_or(MISSING_CODE)
                    })
                    .collect();
                ColumnData::Categorical {
                    codes,
                    dictionary: Arc::clone(target),
                }
            }
        };
        Column {
            name: self.name.clone(),
            role: self.role,
            data,
        }
    }

    pub(crate) fn select_rows(&self, rows: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(rows.iter().map(|&row| values[row]).collect())
            }
            ColumnData::Categorical { codes, dictionary } => ColumnData::Categorical {
                codes: rows.iter().map(|&row| codes[row]).collect(),
                dictionary: Arc::clone(dictionary),
            },
        };
        Column {
            name: self.name.clone(),
            role: self.role,
            data,
        }
    }
}
