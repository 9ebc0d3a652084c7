//! Row-function based table construction.

use crate::core::error::{Result, XgbTableError};
use crate::core::types::{CategoryCode, ColumnRole, MISSING_CODE};
use crate::table::{Column, Dictionary, Table};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a [`Table`] of fixed height column by column.
///
/// ```rust
/// use xgboost_table::table::TableBuilder;
/// use xgboost_table::ColumnRole;
///
/// let table = TableBuilder::new(4)
///     .add_real("A", |i| i as f64)
///     .add_nominal("Label", |i| Some(if i % 2 == 0 { "even" } else { "odd" }))
///     .add_role("Label", ColumnRole::Label)
///     .build()?;
/// assert_eq!(table.height(), 4);
/// # Ok::<(), xgboost_table::XgbTableError>(())
/// ```
#[derive(Debug)]
pub struct TableBuilder {
    height: usize,
    columns: Vec<Column>,
    error: Option<XgbTableError>,
}

impl TableBuilder {
    /// Create a builder for tables with the given number of rows
    pub fn new(height: usize) -> Self {
        TableBuilder {
            height,
            columns: Vec::new(),
            error: None,
        }
    }

    /// Add a numeric column; NaN marks missing values.
    pub fn add_real<S, F>(mut self, name: S, values: F) -> Self
    where
        S: Into<String>,
        F: Fn(usize) -> f64,
    {
        let values = (0..self.height).map(values).collect();
        self.columns.push(Column::numeric(name, values));
        self
    }

    /// Add a categorical column; codes are assigned in order of first appearance.
    pub fn add_nominal<S, F, V>(mut self, name: S, values: F) -> Self
    where
        S: Into<String>,
        F: Fn(usize) -> Option<V>,
        V: AsRef<str>,
    {
        let (codes, labels) = encode_rows(self.height, values);
        let dictionary = Dictionary::new(labels.into_iter().map(Some));
        self.push_categorical(name.into(), codes, Ok(dictionary));
        self
    }

    /// Add a categorical column with a boolean dictionary.
    ///
    /// At most two distinct values may occur; `positive` names the positive one.
    pub fn add_boolean<S, F, V>(mut self, name: S, values: F, positive: &str) -> Self
    where
        S: Into<String>,
        F: Fn(usize) -> Option<V>,
        V: AsRef<str>,
    {
        let (codes, labels) = encode_rows(self.height, values);
        let dictionary = Dictionary::boolean(labels.into_iter().map(Some), Some(positive));
        self.push_categorical(name.into(), codes, dictionary);
        self
    }

    /// Add a prepared column.
    pub fn add_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Tag a previously added column with a role.
    pub fn add_role(mut self, name: &str, role: ColumnRole) -> Self {
        match self.columns.iter_mut().find(|c| c.name() == name) {
            Some(column) => column.set_role(Some(role)),
            None => self.fail(XgbTableError::contract(format!(
                "Cannot assign role {} to unknown column '{}'",
                role, name
            ))),
        }
        self
    }

    /// Build the table, reporting the first error recorded while adding columns.
    pub fn build(self) -> Result<Table> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Table::new(self.columns)
    }

    fn push_categorical(
        &mut self,
        name: String,
        codes: Vec<CategoryCode>,
        dictionary: Result<Dictionary>,
    ) {
        match dictionary.and_then(|d| Column::categorical(name, codes, Arc::new(d))) {
            Ok(column) => self.columns.push(column),
            Err(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: XgbTableError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

fn encode_rows<F, V>(height: usize, values: F) -> (Vec<CategoryCode>, Vec<String>)
where
    F: Fn(usize) -> Option<V>,
    V: AsRef<str>,
{
    let mut lookup: HashMap<String, CategoryCode> = HashMap::new();
    let mut labels = Vec::new();
    let codes = (0..height)
        .map(|row| match values(row) {
            Some(value) => {
                let value = value.as_ref();
                if let Some(&code) = lookup.get(value) {
                    code
                } else {
                    labels.push(value.to_string());
                    let code = labels.len() as CategoryCode;
                    lookup.insert(value.to_string(), code);
                    code
                }
            }
            None => MISSING_CODE,
        })
        .collect();
    (codes, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_codes_follow_first_appearance() {
        let table = TableBuilder::new(5)
            .add_nominal("A", |i| if i == 2 { None } else { Some(["b", "a"][i % 2]) })
            .build()
            .unwrap();
        let column = table.column("A").unwrap();
        assert_eq!(column.codes(), Some(&[1, 2, 0, 2, 1][..]));
        assert_eq!(column.dictionary().unwrap().get(1), Some("b"));
    }

    #[test]
    fn test_boolean_column() {
        let table = TableBuilder::new(4)
            .add_boolean("B", |i| Some(if i % 2 == 0 { "False" } else { "True" }), "True")
            .build()
            .unwrap();
        let dictionary = table.column("B").unwrap().dictionary().unwrap().clone();
        assert!(dictionary.is_boolean());
        assert_eq!(dictionary.get(dictionary.positive_code().unwrap()), Some("True"));
        assert_eq!(dictionary.get(dictionary.negative_code().unwrap()), Some("False"));
    }

    #[test]
    fn test_unknown_role_target() {
        let result = TableBuilder::new(2)
            .add_real("A", |i| i as f64)
            .add_role("Label", ColumnRole::Label)
            .build();
        assert!(result.is_err());
    }
}
