//! Prediction and decoding of native output.
//!
//! The engine returns one row of raw scores per input row. How that row is
//! read depends on the label the model was trained on:
//!
//! - numeric labels: the first value is the prediction;
//! - bicategorical labels: the first value is the probability of the
//!   positive class;
//! - wider labels: one probability per realized class, in compacted order.

use crate::boosting::model::Model;
use crate::boosting::objective::LabelKind;
use crate::core::constants::POSITIVE_THRESHOLD;
use crate::core::error::Result;
use crate::core::types::{CategoryCode, Score, MISSING_CODE};
use crate::dataset::{BinaryCodes, CategoryIndex, ColumnEncoder};
use crate::engine::{EngineError, EngineLock, NativeEngine, OwnedBooster, OwnedMatrix};
use crate::require;
use crate::table::{Column, Dictionary, Table};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-class confidence columns keyed by class label.
pub type ClassScores = BTreeMap<String, Vec<f64>>;

/// Decoded prediction of a table.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Predicted column; categorical predictions share the label dictionary
    pub column: Column,
    /// Class confidences, empty for regression
    pub scores: ClassScores,
}

/// Applies trained models to tables.
#[derive(Clone)]
pub struct Predictor {
    engine: Arc<dyn NativeEngine>,
}

impl Predictor {
    /// Create a predictor for the given engine
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Predictor { engine }
    }

    /// Predict the label of every row of `features`.
    ///
    /// The table must contain the model's feature columns with the kinds
    /// they had during training; other columns are ignored. Categorical
    /// features are encoded with the training dictionaries, so values the
    /// model never saw are treated as missing.
    pub fn predict(&self, model: &Model, features: &Table) -> Result<Prediction> {
        require!(features.height() > 0, "Feature table must not be empty");

        let projected = features.project(model.feature_names())?;
        let adapted = model
            .features()
            .iter()
            .zip(projected.columns())
            .map(|(header, column)| header.adapt(column))
            .collect::<Result<Vec<_>>>()?;
        let matrix = ColumnEncoder::encode_features(&Table::new(adapted)?)?;
        require!(
            matrix.slots() == model.slots(),
            "Feature table does not encode to the features the model was trained on"
        );

        let raw = {
            let engine = self.engine.as_ref();
            let _lock = EngineLock::acquire();
            let booster = OwnedBooster::load(engine, model.booster())?;
            let native = OwnedMatrix::create(engine, matrix.data(), matrix.height(), matrix.width())?;
            booster.predict(&native)?
        };

        if raw.nrows() != matrix.height() || raw.ncols() == 0 {
            return Err(EngineError::call(
                "XGBoosterPredict",
                format!(
                    "expected {} prediction rows, got {} x {}",
                    matrix.height(),
                    raw.nrows(),
                    raw.ncols()
                ),
            )
            .into());
        }

        if let LabelKind::MultiClass { num_class } = model.label().kind() {
            if raw.ncols() != num_class {
                return Err(EngineError::call(
                    "XGBoosterPredict",
                    format!("expected {} class scores per row, got {}", num_class, raw.ncols()),
                )
                .into());
            }
        }

        log::debug!("Decoding {} predictions for {} label", raw.nrows(), model.label().kind());
        decode(model, &raw)
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor").finish_non_exhaustive()
    }
}

/// Name of the column holding the predictions of `label`.
pub fn prediction_name(label: &str) -> String {
    format!("prediction({})", label)
}

fn decode(model: &Model, raw: &Array2<Score>) -> Result<Prediction> {
    let label = model.label();
    let name = prediction_name(label.name());
    let dictionary = label.dictionary();

    match (label.kind(), dictionary) {
        (LabelKind::Regression, _) | (_, None) => Ok(Prediction {
            column: Column::numeric(name, decode_regression(raw)),
            scores: ClassScores::new(),
        }),
        (LabelKind::Bicategorical, Some(dictionary)) => {
            let (codes, scores) = decode_bicategorical(raw, dictionary);
            Ok(Prediction {
                column: Column::categorical(name, codes, Arc::clone(dictionary))?,
                scores,
            })
        }
        (LabelKind::MultiClass { .. }, Some(dictionary)) => {
            let (codes, scores) = decode_multiclass(raw, dictionary);
            Ok(Prediction {
                column: Column::categorical(name, codes, Arc::clone(dictionary))?,
                scores,
            })
        }
    }
}

/// First value of every row.
pub fn decode_regression(raw: &Array2<Score>) -> Vec<f64> {
    raw.rows().into_iter().map(|row| row[0] as f64).collect()
}

/// Threshold positive-class probabilities.
///
/// Scores at or above `0.5` select the positive class. A label with a single
/// realized class predicts that class for every row and has one score column.
pub fn decode_bicategorical(raw: &Array2<Score>, dictionary: &Dictionary) -> (Vec<CategoryCode>, ClassScores) {
    let binary = BinaryCodes::from_dictionary(dictionary);
    let positive_scores: Vec<f64> = raw.rows().into_iter().map(|row| row[0] as f64).collect();

    let codes = match (binary.negative, binary.positive) {
        (Some(negative), Some(positive)) => positive_scores
            .iter()
            .map(|&score| if score >= POSITIVE_THRESHOLD as f64 { positive } else { negative })
            .collect(),
        (Some(only), None) | (None, Some(only)) => vec![only; positive_scores.len()],
        (None, None) => vec![MISSING_CODE; positive_scores.len()],
    };

    let mut scores = ClassScores::new();
    if let Some(value) = binary.negative.and_then(|code| dictionary.get(code)) {
        scores.insert(value.to_string(), positive_scores.iter().map(|s| 1.0 - s).collect());
    }
    if let Some(value) = binary.positive.and_then(|code| dictionary.get(code)) {
        scores.insert(value.to_string(), positive_scores);
    }
    (codes, scores)
}

/// Arg-max over per-class probabilities, ties resolved to the lowest class.
///
/// `raw` must hold one column per realized class.
pub(crate) fn decode_multiclass(raw: &Array2<Score>, dictionary: &Dictionary) -> (Vec<CategoryCode>, ClassScores) {
    let index = CategoryIndex::new(dictionary);
    let classes = index.len();

    let codes = raw
        .rows()
        .into_iter()
        .map(|row| {
            let mut best: Option<(usize, Score)> = None;
            for (slot, &score) in row.iter().take(classes).enumerate() {
                if best.map_or(!score.is_nan(), |(_, max)| score > max) {
                    best = Some((slot, score));
                }
            }
            best.and_then(|(slot, _)| index.code(slot)).unwrap_or(MISSING_CODE)
        })
        .collect();

    let scores = (0..classes)
        .filter_map(|slot| {
            let value = index.code(slot).and_then(|code| dictionary.get(code))?;
            Some((value.to_string(), raw.column(slot).iter().map(|&s| s as f64).collect()))
        })
        .collect();
    (codes, scores)
}
