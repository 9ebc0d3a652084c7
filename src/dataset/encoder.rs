//! Table to flat matrix conversion.
//!
//! Every feature column (a column without role) is encoded in table order:
//!
//! - numeric columns take one slot holding the value, NaN if missing;
//! - categorical columns with at most two realized classes take one slot
//!   holding `0.0` for the negative and `1.0` for the positive class;
//! - wider categorical columns take one slot per realized class; a row sets
//!   the slot of its class to `1.0` and leaves every other slot NaN.
//!
//! The full layout is planned before anything is allocated so that oversized
//! data sets fail with a conversion error instead of exhausting memory.

use crate::core::constants::MAX_ARRAY_LENGTH;
use crate::core::error::{Result, XgbTableError};
use crate::core::types::{CategoryCode, Score};
use crate::dataset::categorical::{BinaryCodes, CategoryIndex};
use crate::dataset::matrix::{EncodedMatrix, Slot, TrainingMatrix};
use crate::table::{Column, ColumnData, Table};
use rayon::prelude::*;

/// Encoding of a single feature column.
#[derive(Debug)]
enum ColumnPlan<'t> {
    Numeric {
        values: &'t [f64],
        offset: usize,
    },
    Binary {
        codes: &'t [CategoryCode],
        binary: BinaryCodes,
        offset: usize,
    },
    OneHot {
        codes: &'t [CategoryCode],
        index: CategoryIndex,
        offset: usize,
    },
}

impl ColumnPlan<'_> {
    #[inline]
    fn fill(&self, row: usize, destination: &mut [Score]) {
        match self {
            ColumnPlan::Numeric { values, offset } => {
                destination[*offset] = values[row] as Score;
            }
            ColumnPlan::Binary {
                codes,
                binary,
                offset,
            } => {
                destination[*offset] = binary.feature_value(codes[row]);
            }
            ColumnPlan::OneHot {
                codes,
                index,
                offset,
            } => {
                if let Some(slot) = index.slot(codes[row]) {
                    destination[offset + slot] = 1.0;
                }
            }
        }
    }
}

/// Converts tables into native matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnEncoder;

impl ColumnEncoder {
    /// Encode the feature columns of a table.
    pub fn encode_features(table: &Table) -> Result<EncodedMatrix> {
        let (plans, slots) = Self::plan(table)?;
        let height = table.height();
        let width = slots.len();

        let size = width
            .checked_mul(height)
            .filter(|&size| size <= MAX_ARRAY_LENGTH)
            .ok_or_else(|| {
                XgbTableError::conversion(format!(
                    "Size of encoded data set exceeds runtime limit: {} rows x {} encoded features",
                    height, width
                ))
            })?;

        log::debug!(
            "Encoding {} feature columns of {} rows into {} slots",
            plans.len(),
            height,
            width
        );

        let mut data = vec![Score::NAN; size];
        data.par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, destination)| {
                for plan in &plans {
                    plan.fill(row, destination);
                }
            });

        Ok(EncodedMatrix::new(data, height, slots))
    }

    /// Encode the label column of a table.
    pub fn encode_label(table: &Table) -> Result<Vec<Score>> {
        let label = table
            .label()
            .ok_or_else(|| XgbTableError::contract("Input table has no label"))?;
        Ok(Self::encode_label_column(label))
    }

    /// Encode a label column.
    ///
    /// Numeric labels pass through. Bicategorical labels become 0/1 with
    /// every other row left at `0.0`. Wider labels become the compacted class
    /// index, `-1` for missing values.
    pub fn encode_label_column(label: &Column) -> Vec<Score> {
        match label.data() {
            ColumnData::Numeric(values) => values.iter().map(|&v| v as Score).collect(),
            ColumnData::Categorical { codes, dictionary } => {
                if dictionary.is_at_most_bicategorical() {
                    let binary = BinaryCodes::from_dictionary(dictionary);
                    codes.iter().map(|&code| binary.label_value(code)).collect()
                } else {
                    let index = CategoryIndex::new(dictionary);
                    codes
                        .iter()
                        .map(|&code| index.slot(code).map_or(-1.0, |slot| slot as Score))
                        .collect()
                }
            }
        }
    }

    /// Encode the optional weight column of a table.
    pub fn encode_weights(table: &Table) -> Result<Option<Vec<Score>>> {
        match table.weight() {
            None => Ok(None),
            Some(column) => match column.numeric_values() {
                Some(values) => Ok(Some(values.iter().map(|&v| v as Score).collect())),
                None => Err(XgbTableError::contract(format!(
                    "Weight column '{}' must be numeric",
                    column.name()
                ))),
            },
        }
    }

    /// Encode features, label and weights of a training table.
    pub fn encode_training(table: &Table) -> Result<TrainingMatrix> {
        let label = Self::encode_label(table)?;
        let features = Self::encode_features(table)?;
        let weights = Self::encode_weights(table)?;
        Ok(TrainingMatrix {
            features,
            label,
            weights,
        })
    }

    /// Number of slots the feature columns of a table encode into.
    pub fn encoded_width(table: &Table) -> usize {
        table.features().map(slot_count).sum()
    }

    fn plan(table: &Table) -> Result<(Vec<ColumnPlan<'_>>, Vec<Slot>)> {
        let mut plans = Vec::new();
        let mut slots = Vec::new();

        for column in table.features() {
            let offset = slots.len();
            match column.data() {
                ColumnData::Numeric(values) => {
                    plans.push(ColumnPlan::Numeric { values, offset });
                    slots.push(single_slot(column));
                }
                ColumnData::Categorical { codes, dictionary } => {
                    if dictionary.is_at_most_bicategorical() {
                        plans.push(ColumnPlan::Binary {
                            codes,
                            binary: BinaryCodes::from_dictionary(dictionary),
                            offset,
                        });
                        slots.push(single_slot(column));
                    } else {
                        slots.extend(dictionary.codes().filter_map(|code| {
                            dictionary.get(code).map(|value| Slot {
                                column: column.name().to_string(),
                                name: format!("{}[{}]", column.name(), value),
                            })
                        }));
                        plans.push(ColumnPlan::OneHot {
                            codes,
                            index: CategoryIndex::new(dictionary),
                            offset,
                        });
                    }
                }
            }
        }

        if plans.is_empty() {
            return Err(XgbTableError::contract("Data table does not contain any feature"));
        }
        Ok((plans, slots))
    }
}

fn single_slot(column: &Column) -> Slot {
    Slot {
        column: column.name().to_string(),
        name: column.name().to_string(),
    }
}

fn slot_count(column: &Column) -> usize {
    match column.dictionary() {
        None => 1,
        Some(dictionary) if dictionary.is_at_most_bicategorical() => 1,
        Some(dictionary) => dictionary.size(),
    }
}
