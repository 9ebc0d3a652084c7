//! Feature importance extraction.
//!
//! The engine scores encoded slots. Scores of the slots derived from one
//! column (several for one-hot encoded columns) are summed into a single
//! score per column.

use crate::boosting::model::Model;
use crate::core::error::Result;
use crate::core::types::ImportanceType;
use crate::engine::{EngineLock, NativeEngine, OwnedBooster};
use crate::table::Table;
use std::collections::HashMap;
use std::sync::Arc;

/// Importance of the feature columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    importance_type: ImportanceType,
    /// In column order of the reference table
    scores: Vec<(String, f64)>,
}

impl FeatureImportance {
    /// Measure the scores were computed with
    pub fn importance_type(&self) -> ImportanceType {
        self.importance_type
    }

    /// Score of a column
    pub fn get(&self, column: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, score)| *score)
    }

    /// Scores in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.scores.iter().map(|(name, score)| (name.as_str(), *score))
    }

    /// Number of scored columns
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no column was scored
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores sorted by descending importance; ties keep column order.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// The `k` most important columns.
    pub fn top_k(&self, k: usize) -> Vec<(String, f64)> {
        let mut ranked = self.ranked();
        ranked.truncate(k);
        ranked
    }
}

/// Reads feature importance from trained models.
#[derive(Clone)]
pub struct ImportanceExtractor {
    engine: Arc<dyn NativeEngine>,
}

impl ImportanceExtractor {
    /// Create an extractor for the given engine
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        ImportanceExtractor { engine }
    }

    /// Total gain of every feature column of `reference`.
    pub fn importance(&self, model: &Model, reference: &Table) -> Result<FeatureImportance> {
        self.importance_with(model, reference, ImportanceType::TotalGain)
    }

    /// Importance of every feature column of `reference` by the given measure.
    ///
    /// Columns the model never split on, or does not know, score `0.0`.
    pub fn importance_with(
        &self,
        model: &Model,
        reference: &Table,
        importance_type: ImportanceType,
    ) -> Result<FeatureImportance> {
        let slot_names = model.slot_names();

        let slot_scores = {
            let engine = self.engine.as_ref();
            let _lock = EngineLock::acquire();
            let booster = OwnedBooster::load(engine, model.booster())?;
            booster.feature_score(&slot_names, importance_type)?
        };

        let mut column_scores: HashMap<&str, f64> = HashMap::new();
        for slot in model.slots() {
            if let Some(score) = slot_scores.get(&slot.name) {
                *column_scores.entry(slot.column.as_str()).or_insert(0.0) += score;
            }
        }

        let scores = reference
            .features()
            .map(|column| {
                let score = column_scores.get(column.name()).copied().unwrap_or(0.0);
                (column.name().to_string(), score)
            })
            .collect();

        log::debug!(
            "Extracted {} importance for {} of {} slots",
            importance_type,
            slot_scores.len(),
            slot_names.len()
        );

        Ok(FeatureImportance {
            importance_type,
            scores,
        })
    }
}

impl std::fmt::Debug for ImportanceExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportanceExtractor").finish_non_exhaustive()
    }
}
