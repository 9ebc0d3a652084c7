//! System constants for xgboost-table.
//!
//! Limits of the native boundary, default learner settings and the names of
//! the engine parameters this crate injects.

/// Largest number of `f32` values a single encoded matrix may hold.
///
/// Conservative bound on array sizes accepted by the native bindings
/// (`i32::MAX - 8`, the common VM array limit).
pub const MAX_ARRAY_LENGTH: usize = i32::MAX as usize - 8;

/// Default maximum number of boosting rounds.
pub const DEFAULT_ROUNDS: usize = 25;

/// Default early stopping round budget.
pub const DEFAULT_EARLY_STOPPING_ROUNDS: usize = 10;

/// Fraction of rows kept for training by the automatic validation split.
pub const AUTO_VALIDATION_TRAINING_RATIO: f64 = 0.7;

/// Score at or above which a bicategorical prediction selects the positive class.
pub const POSITIVE_THRESHOLD: f32 = 0.5;

/// Name of the validation watch passed to the native training loop.
pub const VALIDATION_WATCH: &str = "validation";

/// Hyperparameter key selecting the learning objective.
pub const PARAM_OBJECTIVE: &str = "objective";

/// Hyperparameter key for the number of classes of multi-class objectives.
pub const PARAM_NUM_CLASS: &str = "num_class";

/// Hyperparameter key for the native thread count.
pub const PARAM_NTHREAD: &str = "nthread";

/// Hyperparameter key for the native log verbosity.
pub const PARAM_VERBOSITY: &str = "verbosity";

/// Hyperparameter key for the native random seed.
pub const PARAM_SEED: &str = "seed";

/// Default objective for numeric labels.
pub const OBJECTIVE_REGRESSION: &str = "reg:squarederror";

/// Default objective for labels with at most two classes.
pub const OBJECTIVE_BINARY: &str = "binary:logistic";

/// Default objective for labels with more than two classes.
pub const OBJECTIVE_MULTICLASS: &str = "multi:softprob";

/// Version information.
pub const XGBOOST_TABLE_VERSION: &str = env!("CARGO_PKG_VERSION");
