//! Model training on the native engine.
//!
//! - [`objective`]: learning task and default objective of a label
//! - [`trainer`]: encodes tables and runs the native boosting loop
//! - [`model`]: immutable result of a training run

pub mod model;
pub mod objective;
pub mod trainer;

pub use model::{FeatureHeader, LabelHeader, Model};
pub use objective::{with_default_objective, LabelKind};
pub use trainer::Trainer;
