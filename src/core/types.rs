//! Core data types for xgboost-table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type of encoded matrices and native predictions.
pub type Score = f32;

/// Categorical code; `0` is reserved for missing values.
pub type CategoryCode = u32;

/// Code used for missing categorical values.
pub const MISSING_CODE: CategoryCode = 0;

/// Role metadata attached to a table column.
///
/// Any column carrying a role is excluded from the feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Target column
    Label,
    /// Row weight column
    Weight,
    /// Auxiliary column that is neither feature nor target
    Metadata,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Label => write!(f, "label"),
            ColumnRole::Weight => write!(f, "weight"),
            ColumnRole::Metadata => write!(f, "metadata"),
        }
    }
}

/// Column type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Real values, missing encoded as NaN
    Numeric,
    /// Dictionary codes, missing encoded as code 0
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Feature importance measures understood by the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportanceType {
    /// Number of splits using the feature
    Weight,
    /// Average gain of splits using the feature
    Gain,
    /// Average coverage of splits using the feature
    Cover,
    /// Total gain of splits using the feature
    TotalGain,
    /// Total coverage of splits using the feature
    TotalCover,
}

impl Default for ImportanceType {
    fn default() -> Self {
        ImportanceType::TotalGain
    }
}

impl fmt::Display for ImportanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportanceType::Weight => write!(f, "weight"),
            ImportanceType::Gain => write!(f, "gain"),
            ImportanceType::Cover => write!(f, "cover"),
            ImportanceType::TotalGain => write!(f, "total_gain"),
            ImportanceType::TotalCover => write!(f, "total_cover"),
        }
    }
}
