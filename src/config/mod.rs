//! Configuration of the learner and the engine parameters it forwards.
//!
//! Configurations can be built in code with [`LearnerConfigBuilder`] or read
//! from TOML and JSON files.

pub mod booster;
pub mod core;

pub use self::booster::{
    Booster, EarlyStopping, FeatureSelector, NormalizeType, SampleType, TreeMethod, Updater,
};
pub use self::core::{LearnerConfig, LearnerConfigBuilder};
