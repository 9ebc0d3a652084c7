//! Training orchestration.
//!
//! Encoding happens outside the engine lock. Everything that touches the
//! native engine (matrix creation, the boosting loop, serialization and
//! resource release) runs while [`EngineLock`] is held.

use crate::boosting::model::{FeatureHeader, LabelHeader, Model};
use crate::boosting::objective::{with_default_objective, LabelKind};
use crate::core::constants::VALIDATION_WATCH;
use crate::core::error::{Result, XgbTableError};
use crate::dataset::{ColumnEncoder, TrainingMatrix};
use crate::engine::{
    CancellationToken, EngineError, EngineLock, FloatInfo, GuardedMatrix, MatrixAccess,
    NativeEngine, OwnedBooster, OwnedMatrix, TrainingRequest,
};
use crate::require;
use crate::table::Table;
use std::collections::HashMap;
use std::sync::Arc;

/// Trains models on a native engine.
#[derive(Clone)]
pub struct Trainer {
    engine: Arc<dyn NativeEngine>,
}

impl Trainer {
    /// Create a trainer for the given engine
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Trainer { engine }
    }

    /// Engine this trainer runs on
    pub fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.engine
    }

    /// Train a model.
    ///
    /// `validation`, if given, is watched under the name `"validation"` and
    /// drives early stopping when `early_stopping_rounds > 0`. `parameters`
    /// are passed to the engine verbatim, with a default objective added if
    /// none is named. Returns `Ok(None)` if `cancellation` stopped the run.
    pub fn train(
        &self,
        training: &Table,
        validation: Option<&Table>,
        parameters: &HashMap<String, String>,
        max_iterations: usize,
        early_stopping_rounds: usize,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<Option<Model>> {
        require!(training.height() > 0, "Training table must not be empty");

        let label = training
            .label()
            .ok_or_else(|| XgbTableError::contract("Input table has no label"))?;
        let training_matrix = ColumnEncoder::encode_training(training)?;

        let validation_matrix = match validation {
            Some(table) => {
                require!(table.height() > 0, "Validation table must not be empty");
                require!(
                    table.has_compatible_features(training),
                    "Validation table must have the same regular columns and types as the training table"
                );
                let matrix = ColumnEncoder::encode_training(&table.adapt_like(training))?;
                require!(
                    matrix.features.slots() == training_matrix.features.slots(),
                    "Validation table does not encode to the same features as the training table"
                );
                Some(matrix)
            }
            None => None,
        };

        let kind = LabelKind::of(label);
        let parameters = with_default_objective(parameters, kind);

        log::debug!(
            "Training on {} rows x {} slots for up to {} rounds (early stopping: {})",
            training_matrix.features.height(),
            training_matrix.features.width(),
            max_iterations,
            early_stopping_rounds
        );

        let trained = self.run_native(
            &training_matrix,
            validation_matrix.as_ref(),
            &parameters,
            max_iterations,
            early_stopping_rounds,
            cancellation,
        )?;

        let (iterations, booster) = match trained {
            Some(result) => result,
            None => {
                log::info!("Training was cancelled");
                return Ok(None);
            }
        };

        log::info!("Training finished after {} iterations", iterations);
        Ok(Some(Model::new(
            parameters,
            iterations,
            booster,
            LabelHeader::of(label),
            training.features().map(FeatureHeader::of).collect(),
            training_matrix.features.slots().to_vec(),
        )))
    }

    /// Native part of training; `Ok(None)` on cancellation.
    fn run_native(
        &self,
        training: &TrainingMatrix,
        validation: Option<&TrainingMatrix>,
        parameters: &HashMap<String, String>,
        rounds: usize,
        early_stopping_rounds: usize,
        cancellation: Option<&dyn CancellationToken>,
    ) -> Result<Option<(usize, Vec<u8>)>> {
        let engine = self.engine.as_ref();

        // Declared first so that every matrix below is released while it is held.
        let _lock = EngineLock::acquire();

        let mut train = GuardedMatrix::create(
            engine,
            training.features.data(),
            training.features.height(),
            training.features.width(),
        )?;
        train.set_float_info(FloatInfo::Label, &training.label)?;
        if let Some(weights) = &training.weights {
            train.set_float_info(FloatInfo::Weight, weights)?;
        }

        let watch = match validation {
            Some(matrix) => Some(create_matrix(engine, matrix)?),
            None => None,
        };

        train.set_guard(cancellation);

        let watches: Vec<(&str, &dyn MatrixAccess)> = watch
            .iter()
            .map(|m| (VALIDATION_WATCH, m as &dyn MatrixAccess))
            .collect();
        let request = TrainingRequest {
            parameters,
            rounds,
            early_stopping_rounds,
            train: &train,
            watches: &watches,
        };

        let booster = match engine.train(&request) {
            Ok(handle) => OwnedBooster::new(engine, handle),
            Err(EngineError::Blocked) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let iterations = booster.completed_iterations()?;
        let bytes = booster.save()?;
        drop(booster);

        Ok(Some((iterations, bytes)))
    }
}

fn create_matrix<'e>(engine: &'e dyn NativeEngine, matrix: &TrainingMatrix) -> Result<OwnedMatrix<'e>> {
    let owned = OwnedMatrix::create(
        engine,
        matrix.features.data(),
        matrix.features.height(),
        matrix.features.width(),
    )?;
    owned.set_float_info(FloatInfo::Label, &matrix.label)?;
    if let Some(weights) = &matrix.weights {
        owned.set_float_info(FloatInfo::Weight, weights)?;
    }
    Ok(owned)
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer").finish_non_exhaustive()
    }
}
