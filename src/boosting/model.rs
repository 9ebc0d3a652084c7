//! Trained model container.

use crate::boosting::objective::LabelKind;
use crate::core::constants::PARAM_OBJECTIVE;
use crate::core::error::Result;
use crate::core::types::ColumnKind;
use crate::dataset::Slot;
use crate::require;
use crate::table::{Column, Dictionary};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a model remembers about the label it was trained on.
#[derive(Debug, Clone)]
pub struct LabelHeader {
    name: String,
    kind: LabelKind,
    dictionary: Option<Arc<Dictionary>>,
}

impl LabelHeader {
    /// Capture the header of a label column.
    pub fn of(label: &Column) -> Self {
        LabelHeader {
            name: label.name().to_string(),
            kind: LabelKind::of(label),
            dictionary: label.dictionary().cloned(),
        }
    }

    /// Label column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Learning task of the label
    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    /// Dictionary of a categorical label, shared with the training table
    pub fn dictionary(&self) -> Option<&Arc<Dictionary>> {
        self.dictionary.as_ref()
    }
}

/// What a model remembers about one feature column.
#[derive(Debug, Clone)]
pub struct FeatureHeader {
    name: String,
    kind: ColumnKind,
    dictionary: Option<Arc<Dictionary>>,
}

impl FeatureHeader {
    /// Capture the header of a feature column.
    pub fn of(column: &Column) -> Self {
        FeatureHeader {
            name: column.name().to_string(),
            kind: column.kind(),
            dictionary: column.dictionary().cloned(),
        }
    }

    /// Feature column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column kind seen during training
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Training dictionary of a categorical feature
    pub fn dictionary(&self) -> Option<&Arc<Dictionary>> {
        self.dictionary.as_ref()
    }

    /// Express `column` in the training encoding of this feature.
    ///
    /// Categorical values are re-coded against the training dictionary;
    /// values the training table never saw become missing.
    pub fn adapt(&self, column: &Column) -> Result<Column> {
        require!(
            column.kind() == self.kind,
            "Column '{}' is {} but the model was trained on a {} column",
            self.name,
            column.kind(),
            self.kind
        );
        Ok(match (column.dictionary(), &self.dictionary) {
            (Some(own), Some(target)) if !Arc::ptr_eq(own, target) => column.remap(target),
            _ => column.clone(),
        })
    }
}

/// Immutable result of a training run.
///
/// The booster is an opaque blob understood only by the native engine that
/// produced it.
#[derive(Debug, Clone)]
pub struct Model {
    parameters: HashMap<String, String>,
    iterations: usize,
    booster: Vec<u8>,
    label: LabelHeader,
    features: Vec<FeatureHeader>,
    feature_names: Vec<String>,
    slots: Vec<Slot>,
}

impl Model {
    pub(crate) fn new(
        parameters: HashMap<String, String>,
        iterations: usize,
        booster: Vec<u8>,
        label: LabelHeader,
        features: Vec<FeatureHeader>,
        slots: Vec<Slot>,
    ) -> Self {
        let feature_names = features.iter().map(|f| f.name.clone()).collect();
        Model {
            parameters,
            iterations,
            booster,
            label,
            features,
            feature_names,
            slots,
        }
    }

    /// Parameters the engine was trained with, including injected defaults
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    /// Objective the engine was trained with
    pub fn objective(&self) -> Option<&str> {
        self.parameters.get(PARAM_OBJECTIVE).map(String::as_str)
    }

    /// Number of completed boosting rounds
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Serialized booster
    pub fn booster(&self) -> &[u8] {
        &self.booster
    }

    /// Label the model predicts
    pub fn label(&self) -> &LabelHeader {
        &self.label
    }

    /// Feature column headers in training order
    pub fn features(&self) -> &[FeatureHeader] {
        &self.features
    }

    /// Feature columns in training order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Encoded slots in training order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Encoded slot names in training order
    pub fn slot_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Summary:")?;
        writeln!(f, "  Objective: {}", self.objective().unwrap_or("<engine default>"))?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Label: {} ({})", self.label.name, self.label.kind)?;
        writeln!(f, "  Features: {}", self.feature_names.len())?;
        writeln!(f, "  Encoded slots: {}", self.slots.len())?;
        write!(f, "  Booster size: {} bytes", self.booster.len())
    }
}
