//! Default objective selection.
//!
//! The learning task follows from the label column: numeric labels are
//! regressed, labels with at most two realized classes are classified with a
//! logistic objective and wider labels with a soft-probability multi-class
//! objective. Callers may override the objective through the parameters.

use crate::core::constants::*;
use crate::table::Column;
use std::collections::HashMap;
use std::fmt;

/// Learning task implied by a label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Numeric label
    Regression,
    /// Categorical label with at most two realized classes
    Bicategorical,
    /// Categorical label with more than two realized classes
    MultiClass {
        /// Number of realized classes
        num_class: usize,
    },
}

impl LabelKind {
    /// Classify a label column.
    pub fn of(label: &Column) -> Self {
        match label.dictionary() {
            None => LabelKind::Regression,
            Some(dictionary) if dictionary.is_at_most_bicategorical() => LabelKind::Bicategorical,
            Some(dictionary) => LabelKind::MultiClass {
                num_class: dictionary.size(),
            },
        }
    }

    /// Objective used unless the caller names one.
    pub fn default_objective(&self) -> &'static str {
        match self {
            LabelKind::Regression => OBJECTIVE_REGRESSION,
            LabelKind::Bicategorical => OBJECTIVE_BINARY,
            LabelKind::MultiClass { .. } => OBJECTIVE_MULTICLASS,
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Regression => write!(f, "regression"),
            LabelKind::Bicategorical => write!(f, "bicategorical"),
            LabelKind::MultiClass { num_class } => write!(f, "multi-class ({} classes)", num_class),
        }
    }
}

/// Copy of `parameters` with the default objective filled in.
///
/// Nothing is touched if an objective is present. Otherwise the objective,
/// and for multi-class labels `num_class`, are added.
pub fn with_default_objective(
    parameters: &HashMap<String, String>,
    kind: LabelKind,
) -> HashMap<String, String> {
    let mut parameters = parameters.clone();
    if !parameters.contains_key(PARAM_OBJECTIVE) {
        parameters.insert(PARAM_OBJECTIVE.to_string(), kind.default_objective().to_string());
        if let LabelKind::MultiClass { num_class } = kind {
            parameters
                .entry(PARAM_NUM_CLASS.to_string())
                .or_insert_with(|| num_class.to_string());
        }
        log::debug!(
            "Selected objective '{}' for {} label",
            kind.default_objective(),
            kind
        );
    }
    parameters
}
