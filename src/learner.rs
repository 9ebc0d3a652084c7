//! Configuration driven training.
//!
//! [`Learner`] turns a [`LearnerConfig`] into a [`Trainer::train`] call. It
//! resolves the early stopping mode into a validation table and round
//! budget, and compiles the booster settings into engine parameters.

use crate::boosting::{Model, Trainer};
use crate::config::{EarlyStopping, LearnerConfig};
use crate::core::constants::AUTO_VALIDATION_TRAINING_RATIO;
use crate::core::error::{Result, XgbTableError};
use crate::engine::{CancellationToken, NativeEngine};
use crate::table::{Table, TableSplitter};
use std::sync::Arc;

/// Trains models according to a learner configuration.
#[derive(Debug, Clone)]
pub struct Learner {
    config: LearnerConfig,
    trainer: Trainer,
}

impl Learner {
    /// Create a learner; the configuration is validated first.
    pub fn new(engine: Arc<dyn NativeEngine>, config: LearnerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Learner {
            config,
            trainer: Trainer::new(engine),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Train a model on `data`.
    ///
    /// `validation` is only used, and then required, in `custom` early
    /// stopping mode. In `auto` mode 30% of `data` is held out instead.
    pub fn learn(
        &self,
        data: &Table,
        validation: Option<&Table>,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<Option<Model>> {
        let parameters = self.config.engine_parameters();
        let rounds = self.config.rounds;

        let (training, validation, early_stopping_rounds) = match self.config.early_stopping {
            EarlyStopping::Auto => {
                let splitter = TableSplitter::new(
                    AUTO_VALIDATION_TRAINING_RATIO,
                    self.config.seed.unwrap_or(0),
                )?;
                let (training, holdout) = splitter.split(data)?;
                (training, Some(holdout), self.config.early_stopping_rounds)
            }
            EarlyStopping::Custom => {
                let validation = validation.ok_or_else(|| {
                    XgbTableError::contract("Custom early stopping requires a validation table")
                })?;
                let adapted = Self::adapt_validation(validation, data)?;
                (data.clone(), Some(adapted), self.config.early_stopping_rounds)
            }
            EarlyStopping::None => {
                if validation.is_some() {
                    log::debug!("Ignoring validation table, early stopping is disabled");
                }
                (data.clone(), None, 0)
            }
        };

        log::info!(
            "Learning with {} booster for up to {} rounds (early stopping: {})",
            self.config.booster,
            rounds,
            self.config.early_stopping
        );

        self.trainer.train(
            &training,
            validation.as_ref(),
            &parameters,
            rounds,
            early_stopping_rounds,
            cancellation,
        )
    }

    /// Align a caller supplied validation table with the training table.
    fn adapt_validation(validation: &Table, training: &Table) -> Result<Table> {
        let label_matches = match (validation.label(), training.label()) {
            (Some(a), Some(b)) => a.name() == b.name() && a.kind() == b.kind(),
            (None, None) => true,
            _ => false,
        };
        if !label_matches || !validation.has_compatible_features(training) {
            return Err(XgbTableError::contract(
                "Validation table must have the same regular columns and types as the training table",
            ));
        }
        Ok(validation.adapt_like(training))
    }
}
