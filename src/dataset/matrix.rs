//! Encoded matrices handed to the native engine.

use crate::core::error::{Result, XgbTableError};
use crate::core::types::Score;
use ndarray::{Array2, ArrayView2};

/// One encoded column of the feature matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Table column the slot was derived from
    pub column: String,
    /// Unique slot name, `column` or `column[value]` for one-hot slots
    pub name: String,
}

/// Dense row-major feature matrix.
#[derive(Debug, Clone)]
pub struct EncodedMatrix {
    data: Vec<Score>,
    height: usize,
    width: usize,
    slots: Vec<Slot>,
}

impl EncodedMatrix {
    pub(crate) fn new(data: Vec<Score>, height: usize, slots: Vec<Slot>) -> Self {
        let width = slots.len();
        debug_assert_eq!(data.len(), height * width);
        EncodedMatrix {
            data,
            height,
            width,
            slots,
        }
    }

    /// Row-major values
    pub fn data(&self) -> &[Score] {
        &self.data
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of encoded slots per row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Value at the given position
    pub fn get(&self, row: usize, slot: usize) -> Option<Score> {
        if row < self.height && slot < self.width {
            Some(self.data[row * self.width + slot])
        } else {
            None
        }
    }

    /// Values of one row
    pub fn row(&self, row: usize) -> &[Score] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    /// Slot descriptions in encoding order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot names in encoding order
    pub fn slot_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }

    /// Borrowed two-dimensional view.
    pub fn view(&self) -> Result<ArrayView2<'_, Score>> {
        ArrayView2::from_shape((self.height, self.width), &self.data)
            .map_err(|e| XgbTableError::conversion(format!("Invalid matrix shape: {}", e)))
    }

    /// Owned two-dimensional copy.
    pub fn to_array(&self) -> Result<Array2<Score>> {
        Ok(self.view()?.to_owned())
    }
}

/// Feature matrix with its target and optional weights.
#[derive(Debug, Clone)]
pub struct TrainingMatrix {
    /// Encoded features
    pub features: EncodedMatrix,
    /// Encoded label, one value per row
    pub label: Vec<Score>,
    /// Row weights, one value per row
    pub weights: Option<Vec<Score>>,
}
