//! Code mappings for categorical columns.
//!
//! Two encodings exist. Columns with at most two realized classes collapse
//! into a single 0/1 slot ([`BinaryCodes`]). Wider columns are one-hot
//! encoded over their realized classes only; [`CategoryIndex`] compacts the
//! possibly sparse code space into dense slot indices.

use crate::core::types::{CategoryCode, Score, MISSING_CODE};
use crate::table::Dictionary;

/// Negative and positive codes of a bicategorical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCodes {
    /// Code encoded as `0.0`
    pub negative: Option<CategoryCode>,
    /// Code encoded as `1.0`
    pub positive: Option<CategoryCode>,
}

impl BinaryCodes {
    /// Select the codes of a dictionary with at most two realized classes.
    ///
    /// Boolean dictionaries use their declared codes. Otherwise the maximal
    /// code is positive and the lowest realized code below it is negative.
    pub fn from_dictionary(dictionary: &Dictionary) -> Self {
        if dictionary.is_boolean() {
            return BinaryCodes {
                negative: dictionary.negative_code(),
                positive: dictionary.positive_code(),
            };
        }

        let maximal = dictionary.maximal_code();
        BinaryCodes {
            negative: dictionary.codes().find(|&code| code < maximal),
            positive: Some(maximal).filter(|&code| code != MISSING_CODE),
        }
    }

    /// Feature value of a code: `0.0`, `1.0`, or NaN for anything else.
    pub fn feature_value(&self, code: CategoryCode) -> Score {
        self.value(code).unwrap_or(Score::NAN)
    }

    /// Label value of a code; rows at other codes stay `0.0`.
    pub fn label_value(&self, code: CategoryCode) -> Score {
        self.value(code).unwrap_or(0.0)
    }

    fn value(&self, code: CategoryCode) -> Option<Score> {
        if code == MISSING_CODE {
            None
        } else if Some(code) == self.negative {
            Some(0.0)
        } else if Some(code) == self.positive {
            Some(1.0)
        } else {
            None
        }
    }
}

/// Dense index over the realized codes of a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryIndex {
    /// `slots[code]`, `None` for the missing code and holes
    slots: Vec<Option<usize>>,
    /// `codes[slot]`
    codes: Vec<CategoryCode>,
}

impl CategoryIndex {
    /// Build the lookup table for a dictionary.
    pub fn new(dictionary: &Dictionary) -> Self {
        let mut slots = vec![None; dictionary.allocated() + 1];
        let codes: Vec<CategoryCode> = dictionary.codes().collect();
        for (slot, &code) in codes.iter().enumerate() {
            slots[code as usize] = Some(slot);
        }
        CategoryIndex { slots, codes }
    }

    /// Compacted slot of a code
    pub fn slot(&self, code: CategoryCode) -> Option<usize> {
        self.slots.get(code as usize).copied().flatten()
    }

    /// Code stored in a slot
    pub fn code(&self, slot: usize) -> Option<CategoryCode> {
        self.codes.get(slot).copied()
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the dictionary has no realized class
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_codes_from_plain_dictionary() {
        let dictionary = Dictionary::new(vec![Some("False"), Some("True")]);
        let codes = BinaryCodes::from_dictionary(&dictionary);
        assert_eq!(codes.negative, Some(1));
        assert_eq!(codes.positive, Some(2));
        assert_eq!(codes.feature_value(2), 1.0);
        assert_eq!(codes.feature_value(1), 0.0);
        assert!(codes.feature_value(0).is_nan());
        assert_eq!(codes.label_value(0), 0.0);
    }

    #[test]
    fn test_binary_codes_skip_holes() {
        let dictionary = Dictionary::new(vec![None, Some("x"), None, Some("y")]);
        let codes = BinaryCodes::from_dictionary(&dictionary);
        assert_eq!(codes.negative, Some(2));
        assert_eq!(codes.positive, Some(4));
    }

    #[test]
    fn test_binary_codes_single_class() {
        let dictionary = Dictionary::new(vec![Some("A")]);
        let codes = BinaryCodes::from_dictionary(&dictionary);
        assert_eq!(codes.negative, None);
        assert_eq!(codes.positive, Some(1));

        let empty = Dictionary::new(Vec::<Option<String>>::new());
        let codes = BinaryCodes::from_dictionary(&empty);
        assert_eq!(codes, BinaryCodes { negative: None, positive: None });
    }

    #[test]
    fn test_binary_codes_boolean_dictionary() {
        let dictionary = Dictionary::boolean(vec![Some("True"), Some("False")], Some("True")).unwrap();
        let codes = BinaryCodes::from_dictionary(&dictionary);
        assert_eq!(codes.positive, Some(1));
        assert_eq!(codes.negative, Some(2));
    }

    #[test]
    fn test_category_index_compacts_holes() {
        let dictionary = Dictionary::new(vec![Some("One"), None, Some("Three"), Some("Four")]);
        let index = CategoryIndex::new(&dictionary);
        assert_eq!(index.len(), 3);
        assert_eq!(index.slot(0), None);
        assert_eq!(index.slot(1), Some(0));
        assert_eq!(index.slot(2), None);
        assert_eq!(index.slot(4), Some(2));
        assert_eq!(index.slot(9), None);
        assert_eq!(index.code(1), Some(3));
    }
}
