//! Code-to-label mapping backing categorical columns.

use crate::core::error::{Result, XgbTableError};
use crate::core::types::CategoryCode;
use std::collections::HashMap;

/// Declared positive/negative codes of a boolean dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanCodes {
    /// Code of the positive value, if it is part of the dictionary
    pub positive: Option<CategoryCode>,
    /// Code of the negative value, if it is part of the dictionary
    pub negative: Option<CategoryCode>,
}

/// Dictionary of a categorical column.
///
/// Codes start at 1; code 0 is reserved for missing values. A code may be
/// allocated without a label (a hole), e.g. after values were removed.
/// Only codes with a label count as *realized* classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    /// `values[code - 1]`
    values: Vec<Option<String>>,
    boolean: Option<BooleanCodes>,
}

impl Dictionary {
    /// Create a dictionary, assigning codes `1..=n` in iteration order.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Dictionary {
            values: values.into_iter().map(|v| v.map(Into::into)).collect(),
            boolean: None,
        }
    }

    /// Create a boolean dictionary from at most two realized values.
    ///
    /// The value equal to `positive` becomes the positive code, the other
    /// realized value (if any) the negative code.
    pub fn boolean<I, S>(values: I, positive: Option<&str>) -> Result<Self>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut dictionary = Dictionary::new(values);
        if dictionary.size() > 2 {
            return Err(XgbTableError::contract(format!(
                "Boolean dictionary must not have more than two values, got {}",
                dictionary.size()
            )));
        }

        let positive_code = positive.and_then(|p| dictionary.code_of(p));
        let negative_code = dictionary.codes().find(|&code| Some(code) != positive_code);
        dictionary.boolean = Some(BooleanCodes {
            positive: positive_code,
            negative: negative_code,
        });
        Ok(dictionary)
    }

    /// Label of the given code, `None` for missing codes and holes.
    pub fn get(&self, code: CategoryCode) -> Option<&str> {
        if code == 0 {
            return None;
        }
        self.values
            .get(code as usize - 1)
            .and_then(|v| v.as_deref())
    }

    /// Number of realized classes.
    pub fn size(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Number of allocated codes, including holes.
    pub fn allocated(&self) -> usize {
        self.values.len()
    }

    /// Highest realized code, `0` if the dictionary is empty.
    pub fn maximal_code(&self) -> CategoryCode {
        self.values
            .iter()
            .rposition(|v| v.is_some())
            .map_or(0, |i| i as CategoryCode + 1)
    }

    /// Realized codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = CategoryCode> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_some())
            .map(|(i, _)| i as CategoryCode + 1)
    }

    /// Code of the given label.
    pub fn code_of(&self, value: &str) -> Option<CategoryCode> {
        self.values
            .iter()
            .position(|v| v.as_deref() == Some(value))
            .map(|i| i as CategoryCode + 1)
    }

    /// Label-to-code lookup for bulk conversions.
    pub fn inverse(&self) -> HashMap<&str, CategoryCode> {
        self.codes()
            .filter_map(|code| self.get(code).map(|value| (value, code)))
            .collect()
    }

    /// Whether positive/negative codes were declared.
    pub fn is_boolean(&self) -> bool {
        self.boolean.is_some()
    }

    /// Declared positive code of a boolean dictionary.
    pub fn positive_code(&self) -> Option<CategoryCode> {
        self.boolean.and_then(|b| b.positive)
    }

    /// Declared negative code of a boolean dictionary.
    pub fn negative_code(&self) -> Option<CategoryCode> {
        self.boolean.and_then(|b| b.negative)
    }

    /// At most two realized classes.
    pub fn is_at_most_bicategorical(&self) -> bool {
        self.size() <= 2
    }

    /// Copy of this dictionary with the label of `code` removed, leaving a hole.
    pub fn without(&self, code: CategoryCode) -> Dictionary {
        let mut values = self.values.clone();
        if code > 0 {
            if let Some(slot) = values.get_mut(code as usize - 1) {
                *slot = None;
            }
        }
        let boolean = self.boolean.map(|b| BooleanCodes {
            positive: b.positive.filter(|&c| c != code),
            negative: b.negative.filter(|&c| c != code),
        });
        Dictionary { values, boolean }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_dictionary() {
        let dictionary = Dictionary::new(vec![Some("One"), Some("Two"), Some("Three")]);
        assert_eq!(dictionary.size(), 3);
        assert_eq!(dictionary.maximal_code(), 3);
        assert_eq!(dictionary.get(0), None);
        assert_eq!(dictionary.get(2), Some("Two"));
        assert_eq!(dictionary.get(4), None);
        assert_eq!(dictionary.code_of("Three"), Some(3));
        assert!(!dictionary.is_boolean());
        assert!(!dictionary.is_at_most_bicategorical());
    }

    #[test]
    fn test_sparse_dictionary() {
        let dictionary = Dictionary::new(vec![Some("A"), None, Some("C"), None]);
        assert_eq!(dictionary.size(), 2);
        assert_eq!(dictionary.allocated(), 4);
        assert_eq!(dictionary.maximal_code(), 3);
        assert_eq!(dictionary.codes().collect::<Vec<_>>(), vec![1, 3]);
        assert!(dictionary.is_at_most_bicategorical());
    }

    #[test]
    fn test_boolean_dictionary() {
        let dictionary = Dictionary::boolean(vec![Some("False"), Some("True")], Some("True")).unwrap();
        assert!(dictionary.is_boolean());
        assert_eq!(dictionary.positive_code(), Some(2));
        assert_eq!(dictionary.negative_code(), Some(1));

        let single = Dictionary::boolean(vec![Some("True")], Some("True")).unwrap();
        assert_eq!(single.positive_code(), Some(1));
        assert_eq!(single.negative_code(), None);

        let too_many = Dictionary::boolean(vec![Some("A"), Some("B"), Some("C")], Some("A"));
        assert!(too_many.is_err());
    }

    #[test]
    fn test_without_creates_hole() {
        let dictionary = Dictionary::new(vec![Some("One"), Some("Two"), Some("Three")]);
        let sparse = dictionary.without(2);
        assert_eq!(sparse.size(), 2);
        assert_eq!(sparse.get(2), None);
        assert_eq!(sparse.inverse().get("Three"), Some(&3));
    }
}
