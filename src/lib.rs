//! # xgboost-table
//!
//! Bridge between typed tables and a native XGBoost-style boosting engine.
//!
//! The boosting itself happens inside the engine. This crate takes care of
//! everything around it:
//!
//! - **Encoding**: numeric, categorical and missing values are converted into
//!   the flat `f32` matrix the engine consumes (one-hot encoding for wide
//!   categorical columns, 0/1 encoding for bicategorical ones).
//! - **Orchestration**: every native call is serialized by a process-wide
//!   lock, native resources are released on every exit path, and a
//!   cancellation token can stop a running boosting loop.
//! - **Decoding**: raw engine output becomes a typed prediction column that
//!   shares the label's dictionary, plus per-class confidence columns.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use xgboost_table::{ColumnRole, NativeEngine, Predictor, TableBuilder, Trainer};
//!
//! # fn example(engine: Arc<dyn NativeEngine>) -> xgboost_table::Result<()> {
//! xgboost_table::init()?;
//!
//! let data = TableBuilder::new(100)
//!     .add_real("A", |i| i as f64)
//!     .add_nominal("Label", |i| Some(if i % 2 == 0 { "even" } else { "odd" }))
//!     .add_role("Label", ColumnRole::Label)
//!     .build()?;
//!
//! let trainer = Trainer::new(Arc::clone(&engine));
//! if let Some(model) = trainer.train(&data, None, &HashMap::new(), 10, 0, None)? {
//!     let prediction = Predictor::new(engine).predict(&model, &data)?;
//!     println!("{:?}", prediction.scores.keys().collect::<Vec<_>>());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: error handling, constants and shared types
//! - [`table`]: typed table model (columns, dictionaries, roles)
//! - [`engine`]: native engine boundary, global lock and cancellation
//! - [`dataset`]: table to matrix encoding
//! - [`boosting`]: training orchestration and the model container
//! - [`prediction`]: prediction decoding and feature importance
//! - [`config`] and [`learner`]: configuration driven training

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

pub mod core;

pub mod table;

pub mod engine;

pub mod dataset;

pub mod boosting;

pub mod prediction;

pub mod config;

pub mod learner;

// Re-export core functionality for convenience
pub use crate::core::{
    constants::*,
    error::{Result, XgbTableError},
    types::*,
};

pub use crate::table::{Column, ColumnData, Dictionary, Table, TableBuilder, TableSplitter};

pub use crate::engine::{
    AlwaysActive, CancellationFlag, CancellationToken, EngineError, EngineLock, NativeEngine,
};

pub use crate::dataset::{ColumnEncoder, EncodedMatrix, TrainingMatrix};

pub use crate::boosting::{LabelKind, Model, Trainer};

pub use crate::prediction::{ClassScores, FeatureImportance, ImportanceExtractor, Prediction, Predictor};

pub use crate::config::{Booster, EarlyStopping, LearnerConfig, LearnerConfigBuilder};

pub use crate::learner::Learner;

// Version information
pub use crate::core::constants::XGBOOST_TABLE_VERSION as VERSION;

/// Initialize the library.
///
/// Installs the `env_logger` backend for the `log` facade unless the host
/// application already installed a logger. Calling it is optional.
///
/// ```rust
/// fn main() -> xgboost_table::Result<()> {
///     xgboost_table::init()?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    crate::core::initialize_logging();
    Ok(())
}
