//! Learner configuration.
//!
//! [`LearnerConfig`] holds the meta options consumed by the learner (round
//! budget, early stopping) and the booster parameters forwarded to the
//! native engine. [`LearnerConfig::engine_parameters`] compiles the latter
//! into the string map the engine receives.

use crate::config::booster::*;
use crate::core::constants::*;
use crate::core::error::{Result, XgbTableError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Learner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Maximum number of boosting rounds
    pub rounds: usize,
    /// Source of the validation data for early stopping
    pub early_stopping: EarlyStopping,
    /// Rounds without improvement before training stops
    pub early_stopping_rounds: usize,

    /// Boosting algorithm
    pub booster: Booster,

    // Tree boosters
    /// Step size shrinkage
    pub learning_rate: f64,
    /// Minimum loss reduction to split a leaf
    pub min_split_loss: f64,
    /// Maximum tree depth
    pub max_depth: u32,
    /// Minimum hessian sum of a child
    pub min_child_weight: f64,
    /// Row subsampling ratio
    pub subsample: f64,
    /// Tree construction algorithm
    pub tree_method: TreeMethod,

    // All boosters
    /// L2 regularization
    pub lambda: f64,
    /// L1 regularization
    pub alpha: f64,

    // DART
    /// Dropout sampling
    pub sample_type: SampleType,
    /// Dropout normalization
    pub normalize_type: NormalizeType,
    /// Fraction of trees to drop
    pub rate_drop: f64,
    /// Probability of skipping dropout in a round
    pub skip_drop: f64,

    // Linear booster
    /// Linear fitting algorithm
    pub updater: Updater,
    /// Linear feature ordering
    pub feature_selector: FeatureSelector,
    /// Features considered by greedy and thrifty selectors
    pub top_k: usize,

    /// Native thread count, all cores if unset
    pub parallelism: Option<usize>,
    /// Native random seed, drawn at random if unset
    pub seed: Option<u64>,
    /// Raw engine parameters applied last; empty values are ignored
    pub expert_parameters: BTreeMap<String, String>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        LearnerConfig {
            rounds: DEFAULT_ROUNDS,
            early_stopping: EarlyStopping::None,
            early_stopping_rounds: DEFAULT_EARLY_STOPPING_ROUNDS,
            booster: Booster::Tree,
            learning_rate: 0.3,
            min_split_loss: 0.0,
            max_depth: 6,
            min_child_weight: 1.0,
            subsample: 1.0,
            tree_method: TreeMethod::Auto,
            lambda: 1.0,
            alpha: 0.0,
            sample_type: SampleType::Uniform,
            normalize_type: NormalizeType::Tree,
            rate_drop: 0.0,
            skip_drop: 0.0,
            updater: Updater::Shotgun,
            feature_selector: FeatureSelector::Cyclic,
            top_k: 0,
            parallelism: None,
            seed: None,
            expert_parameters: BTreeMap::new(),
        }
    }
}

impl LearnerConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(XgbTableError::invalid_parameter(
                "rounds",
                "0",
                "must be at least 1",
            ));
        }

        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("subsample", self.subsample),
            ("rate_drop", self.rate_drop),
            ("skip_drop", self.skip_drop),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(XgbTableError::invalid_parameter(
                    name,
                    value.to_string(),
                    "must be in range [0.0, 1.0]",
                ));
            }
        }

        for (name, value) in [
            ("min_split_loss", self.min_split_loss),
            ("min_child_weight", self.min_child_weight),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(XgbTableError::invalid_parameter(
                    name,
                    value.to_string(),
                    "must be non-negative",
                ));
            }
        }

        if self.parallelism == Some(0) {
            return Err(XgbTableError::invalid_parameter(
                "parallelism",
                "0",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Thread count passed to the engine
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(num_cpus::get)
    }

    /// Compile the parameters forwarded to the native engine.
    ///
    /// Only parameters of the selected booster are included. `nthread`,
    /// `verbosity` and `seed` are injected, then expert parameters are
    /// applied on top. Without a configured seed a fresh one is drawn on
    /// every call.
    pub fn engine_parameters(&self) -> HashMap<String, String> {
        let mut parameters = HashMap::new();
        let mut put = |key: &str, value: String| {
            parameters.insert(key.to_string(), value);
        };

        put("booster", self.booster.to_string());

        if self.booster.is_tree_based() {
            put("learning_rate", self.learning_rate.to_string());
            put("min_split_loss", self.min_split_loss.to_string());
            put("max_depth", self.max_depth.to_string());
            put("min_child_weight", self.min_child_weight.to_string());
            put("subsample", self.subsample.to_string());
            put("tree_method", self.tree_method.to_string());
        }

        put("lambda", self.lambda.to_string());
        put("alpha", self.alpha.to_string());

        match self.booster {
            Booster::Dart => {
                put("sample_type", self.sample_type.to_string());
                put("normalize_type", self.normalize_type.to_string());
                put("rate_drop", self.rate_drop.to_string());
                put("skip_drop", self.skip_drop.to_string());
            }
            Booster::Linear => {
                put("updater", self.updater.to_string());
                put("feature_selector", self.feature_selector.to_string());
                if self.feature_selector.uses_top_k() {
                    put("top_k", self.top_k.to_string());
                }
            }
            Booster::Tree => {}
        }

        put(PARAM_NTHREAD, self.effective_parallelism().to_string());
        put(PARAM_VERBOSITY, "0".to_string());
        let seed = self
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen::<u32>() as u64);
        put(PARAM_SEED, seed.to_string());

        for (key, value) in &self.expert_parameters {
            if !value.is_empty() {
                put(key, value.clone());
            }
        }

        parameters
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: LearnerConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(XgbTableError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        log::debug!("Loaded learner configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| XgbTableError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(XgbTableError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Builder for [`LearnerConfig`]
#[derive(Debug, Clone, Default)]
pub struct LearnerConfigBuilder {
    config: LearnerConfig,
}

impl LearnerConfigBuilder {
    /// Create a builder starting from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of boosting rounds
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.config.rounds = rounds;
        self
    }

    /// Set the early stopping mode
    pub fn early_stopping(mut self, mode: EarlyStopping) -> Self {
        self.config.early_stopping = mode;
        self
    }

    /// Set the early stopping round budget
    pub fn early_stopping_rounds(mut self, rounds: usize) -> Self {
        self.config.early_stopping_rounds = rounds;
        self
    }

    /// Set the boosting algorithm
    pub fn booster(mut self, booster: Booster) -> Self {
        self.config.booster = booster;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.config.learning_rate = rate;
        self
    }

    /// Set the maximum tree depth
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the row subsampling ratio
    pub fn subsample(mut self, ratio: f64) -> Self {
        self.config.subsample = ratio;
        self
    }

    /// Set the tree construction algorithm
    pub fn tree_method(mut self, method: TreeMethod) -> Self {
        self.config.tree_method = method;
        self
    }

    /// Set the L2 and L1 regularization terms
    pub fn regularization(mut self, lambda: f64, alpha: f64) -> Self {
        self.config.lambda = lambda;
        self.config.alpha = alpha;
        self
    }

    /// Set the DART dropout rates
    pub fn dropout(mut self, rate_drop: f64, skip_drop: f64) -> Self {
        self.config.rate_drop = rate_drop;
        self.config.skip_drop = skip_drop;
        self
    }

    /// Set the linear feature selector and its `top_k`
    pub fn feature_selector(mut self, selector: FeatureSelector, top_k: usize) -> Self {
        self.config.feature_selector = selector;
        self.config.top_k = top_k;
        self
    }

    /// Set the native thread count
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.config.parallelism = Some(threads);
        self
    }

    /// Set the native random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Add a raw engine parameter
    pub fn expert_parameter<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.expert_parameters.insert(key.into(), value.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<LearnerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
