//! Prediction and model inspection.
//!
//! - [`decoder`]: applies a model to a table and decodes the native output
//! - [`feature_importance`]: per-column importance scores of a model

pub mod decoder;
pub mod feature_importance;

pub use decoder::{ClassScores, Prediction, Predictor};
pub use feature_importance::{FeatureImportance, ImportanceExtractor};
