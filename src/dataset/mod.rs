//! Conversion of typed tables into native engine matrices.

pub mod categorical;
pub mod encoder;
pub mod matrix;

pub use categorical::{BinaryCodes, CategoryIndex};
pub use encoder::ColumnEncoder;
pub use matrix::{EncodedMatrix, Slot, TrainingMatrix};
