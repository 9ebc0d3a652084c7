//! Enumerated engine settings.
//!
//! Each variant serializes to the name the native engine expects. The
//! descriptive spellings (`"tree booster"`, `"histogram"`, ...) are accepted
//! as aliases when reading configuration files.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! engine_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $native:literal $(| $alias:literal)*),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $native $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// Name understood by the native engine
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $native,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

engine_enum! {
    /// Boosting algorithm.
    Booster {
        /// Gradient boosted trees
        Tree => "gbtree" | "tree booster",
        /// Gradient boosted linear models
        Linear => "gblinear" | "linear booster",
        /// Trees with dropout
        Dart => "dart" | "DART",
    }
    default Tree
}

impl Booster {
    /// Whether the booster grows trees
    pub fn is_tree_based(&self) -> bool {
        matches!(self, Booster::Tree | Booster::Dart)
    }
}

engine_enum! {
    /// Tree construction algorithm.
    TreeMethod {
        /// Let the engine decide
        Auto => "auto",
        /// Exact greedy split search
        Exact => "exact",
        /// Quantile sketch approximation
        Approx => "approx" | "approximate",
        /// Histogram based split search
        Hist => "hist" | "histogram",
    }
    default Auto
}

engine_enum! {
    /// DART dropout sampling.
    SampleType {
        /// Uniform tree selection
        Uniform => "uniform",
        /// Selection proportional to weight
        Weighted => "weighted",
    }
    default Uniform
}

engine_enum! {
    /// DART weight normalization.
    NormalizeType {
        /// Normalize by the number of trees
        Tree => "tree",
        /// Normalize by the forest weight
        Forest => "forest",
    }
    default Tree
}

engine_enum! {
    /// Fitting algorithm of the linear booster.
    Updater {
        /// Parallel coordinate descent
        Shotgun => "shotgun",
        /// Ordinary coordinate descent
        CoordDescent => "coord_descent",
    }
    default Shotgun
}

engine_enum! {
    /// Feature ordering of the linear booster.
    FeatureSelector {
        /// Cycle through features
        Cyclic => "cyclic",
        /// Shuffled cyclic order
        Shuffle => "shuffle",
        /// Random order with replacement
        Random => "random",
        /// Largest gradient first
        Greedy => "greedy",
        /// Approximate greedy
        Thrifty => "thrifty",
    }
    default Cyclic
}

impl FeatureSelector {
    /// Whether the selector honors `top_k`
    pub fn uses_top_k(&self) -> bool {
        matches!(self, FeatureSelector::Greedy | FeatureSelector::Thrifty)
    }
}

engine_enum! {
    /// Source of the validation data driving early stopping.
    EarlyStopping {
        /// No early stopping
        None => "none",
        /// Hold out part of the training data
        Auto => "auto",
        /// Caller supplied validation table
        Custom => "custom",
    }
    default None
}
