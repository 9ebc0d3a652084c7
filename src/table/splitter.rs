//! Shuffled two-way row split of a table.

use crate::core::error::{Result, XgbTableError};
use crate::table::Table;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Splits a table into a training part and a holdout part.
#[derive(Debug, Clone, Copy)]
pub struct TableSplitter {
    ratio: f64,
    seed: u64,
}

impl TableSplitter {
    /// Create a splitter keeping `ratio` of the rows in the first part.
    pub fn new(ratio: f64, seed: u64) -> Result<Self> {
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(XgbTableError::invalid_parameter(
                "ratio",
                ratio.to_string(),
                "must be strictly between 0 and 1",
            ));
        }
        Ok(TableSplitter { ratio, seed })
    }

    /// Fraction of rows in the first part
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Shuffle the rows and cut them into two non-empty tables.
    pub fn split(&self, table: &Table) -> Result<(Table, Table)> {
        let height = table.height();
        if height < 2 {
            return Err(XgbTableError::contract(format!(
                "Cannot split a table with {} rows into two non-empty parts",
                height
            )));
        }

        let mut rows: Vec<usize> = (0..height).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        rows.shuffle(&mut rng);

        let cut = ((height as f64 * self.ratio).round() as usize).clamp(1, height - 1);
        let (first, second) = rows.split_at(cut);

        log::debug!(
            "Split {} rows into {} training and {} holdout rows",
            height,
            first.len(),
            second.len()
        );
        Ok((table.select_rows(first)?, table.select_rows(second)?))
    }
}
