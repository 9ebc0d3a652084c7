//! Common test utilities for xgboost-table integration tests.
//!
//! [`ScriptedEngine`] is an in-process stand-in for the native engine. It
//! keeps matrices and boosters in handle tables, counts live resources and
//! records how many calls ever overlapped, so tests can check the resource
//! and locking guarantees of the bridge.

#![allow(dead_code)]

use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use xgboost_table::engine::{
    BoosterHandle, EngineError, EngineResult, FloatInfo, MatrixHandle, NativeEngine,
    TrainingRequest,
};
use xgboost_table::{ColumnRole, ImportanceType, Score, Table, TableBuilder};

/// How a trained booster predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Weighted constant model: mean label, positive rate or class frequencies
    Prior,
    /// Exact lookup of training rows, falling back to the prior
    Memorizing,
}

const SUPPORTED_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:tweedie",
    "count:poisson",
    "binary:logistic",
    "multi:softprob",
];

#[derive(Debug, Clone)]
struct MatrixData {
    data: Vec<Score>,
    rows: usize,
    cols: usize,
    label: Vec<Score>,
    weight: Option<Vec<Score>>,
}

impl MatrixData {
    fn row(&self, row: usize) -> &[Score] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    fn weight(&self, row: usize) -> f64 {
        self.weight.as_ref().map_or(1.0, |w| w[row] as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoosterState {
    objective: String,
    mode: Mode,
    outputs: usize,
    prior: Vec<Score>,
    memory: Vec<(Vec<u32>, Vec<Score>)>,
    version: u32,
    rounds: usize,
    gains: Vec<f64>,
}

impl BoosterState {
    fn predict_row(&self, row: &[Score]) -> Vec<Score> {
        if self.mode == Mode::Memorizing {
            let key = row_key(row);
            if let Some((_, output)) = self.memory.iter().find(|(k, _)| *k == key) {
                return output.clone();
            }
        }
        self.prior.clone()
    }
}

#[derive(Debug, Default)]
struct EngineState {
    next_id: u64,
    matrices: HashMap<u64, MatrixData>,
    boosters: HashMap<u64, BoosterState>,
    matrices_created: usize,
    uploads: Vec<Vec<Score>>,
}

impl EngineState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn matrix(&self, handle: MatrixHandle, call: &'static str) -> EngineResult<&MatrixData> {
        self.matrices
            .get(&handle.0)
            .ok_or_else(|| EngineError::call(call, format!("unknown {}", handle)))
    }

    fn booster(&self, handle: BoosterHandle, call: &'static str) -> EngineResult<&BoosterState> {
        self.boosters
            .get(&handle.0)
            .ok_or_else(|| EngineError::call(call, format!("unknown {}", handle)))
    }
}

/// In-process engine with deterministic, inspectable behavior.
#[derive(Debug)]
pub struct ScriptedEngine {
    mode: Mode,
    report_rounds: bool,
    latency: Duration,
    state: Mutex<EngineState>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedEngine {
    /// Engine whose boosters predict the weighted label prior.
    pub fn new() -> Self {
        Self::with_mode(Mode::Prior)
    }

    /// Engine whose boosters remember their training rows.
    pub fn memorizing() -> Self {
        Self::with_mode(Mode::Memorizing)
    }

    pub fn with_mode(mode: Mode) -> Self {
        ScriptedEngine {
            mode,
            report_rounds: false,
            latency: Duration::ZERO,
            state: Mutex::new(EngineState::default()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Report completed rounds directly instead of through the version counter.
    pub fn reporting_rounds(mut self) -> Self {
        self.report_rounds = true;
        self
    }

    /// Sleep inside every training call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn live_matrices(&self) -> usize {
        self.state.lock().unwrap().matrices.len()
    }

    pub fn live_boosters(&self) -> usize {
        self.state.lock().unwrap().boosters.len()
    }

    pub fn matrices_created(&self) -> usize {
        self.state.lock().unwrap().matrices_created
    }

    /// Feature values of the `n`-th matrix ever created, row-major.
    pub fn uploaded(&self, n: usize) -> Vec<Score> {
        self.state.lock().unwrap().uploads[n].clone()
    }

    /// Highest number of engine calls that were ever in flight at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn enter(&self) -> CallGuard<'_> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        CallGuard(&self.active)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

struct CallGuard<'a>(&'a AtomicUsize);

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NativeEngine for ScriptedEngine {
    fn create_matrix(&self, data: &[Score], rows: usize, cols: usize) -> EngineResult<MatrixHandle> {
        let _call = self.enter();
        if data.len() != rows * cols {
            return Err(EngineError::call(
                "XGDMatrixCreateFromMat",
                format!("{} values for {} x {}", data.len(), rows, cols),
            ));
        }
        let mut state = self.state.lock().unwrap();
        let id = state.allocate();
        state.matrices_created += 1;
        state.uploads.push(data.to_vec());
        state.matrices.insert(
            id,
            MatrixData {
                data: data.to_vec(),
                rows,
                cols,
                label: vec![0.0; rows],
                weight: None,
            },
        );
        Ok(MatrixHandle(id))
    }

    fn set_float_info(&self, matrix: MatrixHandle, field: FloatInfo, values: &[Score]) -> EngineResult<()> {
        let _call = self.enter();
        let mut state = self.state.lock().unwrap();
        let data = state
            .matrices
            .get_mut(&matrix.0)
            .ok_or_else(|| EngineError::call("XGDMatrixSetFloatInfo", format!("unknown {}", matrix)))?;
        if values.len() != data.rows {
            return Err(EngineError::call(
                "XGDMatrixSetFloatInfo",
                format!("{} has {} rows, got {} {} values", matrix, data.rows, values.len(), field),
            ));
        }
        match field {
            FloatInfo::Label => data.label = values.to_vec(),
            FloatInfo::Weight => data.weight = Some(values.to_vec()),
        }
        Ok(())
    }

    fn free_matrix(&self, matrix: MatrixHandle) -> EngineResult<()> {
        let _call = self.enter();
        match self.state.lock().unwrap().matrices.remove(&matrix.0) {
            Some(_) => Ok(()),
            None => Err(EngineError::call("XGDMatrixFree", format!("unknown {}", matrix))),
        }
    }

    fn train(&self, request: &TrainingRequest<'_>) -> EngineResult<BoosterHandle> {
        let _call = self.enter();
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        let objective = request
            .parameters
            .get("objective")
            .cloned()
            .unwrap_or_else(|| "reg:squarederror".to_string());
        if !SUPPORTED_OBJECTIVES.contains(&objective.as_str()) {
            return Err(EngineError::call(
                "XGBoosterSetParam",
                format!("Unknown objective function: `{}`", objective),
            ));
        }
        let outputs = match objective.as_str() {
            "multi:softprob" => request
                .parameters
                .get("num_class")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .ok_or_else(|| EngineError::call("XGBoosterSetParam", "num_class must be set"))?,
            _ => 1,
        };

        let stop_after = if !request.watches.is_empty() && request.early_stopping_rounds > 0 {
            request.rounds.min(1 + request.early_stopping_rounds)
        } else {
            request.rounds
        };

        let mut rounds = 0;
        let mut train_handle = None;
        while rounds < stop_after {
            train_handle = Some(request.train.handle()?);
            for (_, watch) in request.watches {
                watch.handle()?;
            }
            rounds += 1;
        }
        let train_handle = match train_handle {
            Some(handle) => handle,
            None => request.train.handle()?,
        };

        let mut state = self.state.lock().unwrap();
        let matrix = state.matrix(train_handle, "XGBoosterUpdateOneIter")?.clone();
        let targets = targets(&matrix, &objective, outputs)?;

        let prior = weighted_mean(
            targets.iter().enumerate().filter_map(|(row, t)| {
                t.as_ref().map(|t| (t.as_slice(), matrix.weight(row)))
            }),
            outputs,
        );

        let mut memory: Vec<(Vec<u32>, Vec<(Vec<Score>, f64)>)> = Vec::new();
        if self.mode == Mode::Memorizing {
            for (row, target) in targets.iter().enumerate() {
                let Some(target) = target else { continue };
                let key = row_key(matrix.row(row));
                let entry = (target.clone(), matrix.weight(row));
                match memory.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, seen)) => seen.push(entry),
                    None => memory.push((key, vec![entry])),
                }
            }
        }
        let memory = memory
            .into_iter()
            .map(|(key, seen)| {
                let output = weighted_mean(seen.iter().map(|(t, w)| (t.as_slice(), *w)), outputs);
                (key, output)
            })
            .collect();

        let gains = (0..matrix.cols)
            .map(|col| correlation(&matrix, col, &targets))
            .collect();

        let id = state.allocate();
        state.boosters.insert(
            id,
            BoosterState {
                objective,
                mode: self.mode,
                outputs,
                prior,
                memory,
                version: 2 * rounds as u32,
                rounds,
                gains,
            },
        );
        Ok(BoosterHandle(id))
    }

    fn booster_version(&self, booster: BoosterHandle) -> EngineResult<u32> {
        let _call = self.enter();
        let state = self.state.lock().unwrap();
        Ok(state.booster(booster, "XGBoosterGetVersion")?.version)
    }

    fn completed_rounds(&self, booster: BoosterHandle) -> EngineResult<Option<usize>> {
        let _call = self.enter();
        if !self.report_rounds {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        Ok(Some(state.booster(booster, "XGBoosterBoostedRounds")?.rounds))
    }

    fn save_booster(&self, booster: BoosterHandle) -> EngineResult<Vec<u8>> {
        let _call = self.enter();
        let state = self.state.lock().unwrap();
        let booster = state.booster(booster, "XGBoosterSaveModelToBuffer")?;
        serde_json::to_vec(booster).map_err(|e| EngineError::call("XGBoosterSaveModelToBuffer", e.to_string()))
    }

    fn load_booster(&self, bytes: &[u8]) -> EngineResult<BoosterHandle> {
        let _call = self.enter();
        let booster: BoosterState = serde_json::from_slice(bytes)
            .map_err(|e| EngineError::call("XGBoosterLoadModelFromBuffer", e.to_string()))?;
        let mut state = self.state.lock().unwrap();
        let id = state.allocate();
        state.boosters.insert(id, booster);
        Ok(BoosterHandle(id))
    }

    fn predict(&self, booster: BoosterHandle, matrix: MatrixHandle) -> EngineResult<Array2<Score>> {
        let _call = self.enter();
        let state = self.state.lock().unwrap();
        let booster = state.booster(booster, "XGBoosterPredict")?;
        let matrix = state.matrix(matrix, "XGBoosterPredict")?;
        if booster.gains.len() != matrix.cols {
            return Err(EngineError::call(
                "XGBoosterPredict",
                format!("booster expects {} columns, got {}", booster.gains.len(), matrix.cols),
            ));
        }
        let mut output = Array2::zeros((matrix.rows, booster.outputs));
        for row in 0..matrix.rows {
            for (slot, value) in booster.predict_row(matrix.row(row)).into_iter().enumerate() {
                output[[row, slot]] = value;
            }
        }
        Ok(output)
    }

    fn feature_score(
        &self,
        booster: BoosterHandle,
        feature_names: &[String],
        importance: ImportanceType,
    ) -> EngineResult<HashMap<String, f64>> {
        let _call = self.enter();
        let state = self.state.lock().unwrap();
        let booster = state.booster(booster, "XGBoosterFeatureScore")?;
        if feature_names.len() != booster.gains.len() {
            return Err(EngineError::call(
                "XGBoosterFeatureScore",
                format!("{} names for {} features", feature_names.len(), booster.gains.len()),
            ));
        }
        Ok(feature_names
            .iter()
            .zip(&booster.gains)
            .filter(|(_, &gain)| gain > 0.0)
            .map(|(name, &gain)| {
                let score = match importance {
                    ImportanceType::Weight => 1.0,
                    ImportanceType::TotalGain | ImportanceType::TotalCover => gain * booster.rounds as f64,
                    _ => gain,
                };
                (name.clone(), score)
            })
            .collect())
    }

    fn free_booster(&self, booster: BoosterHandle) -> EngineResult<()> {
        let _call = self.enter();
        match self.state.lock().unwrap().boosters.remove(&booster.0) {
            Some(_) => Ok(()),
            None => Err(EngineError::call("XGBoosterFree", format!("unknown {}", booster))),
        }
    }
}

/// Per-row training targets; `None` marks rows without a usable label.
fn targets(matrix: &MatrixData, objective: &str, outputs: usize) -> EngineResult<Vec<Option<Vec<Score>>>> {
    matrix
        .label
        .iter()
        .map(|&label| {
            if label.is_nan() || (objective.starts_with("multi:") && label < 0.0) {
                return Ok(None);
            }
            if objective.starts_with("multi:") {
                let class = label as usize;
                if class >= outputs {
                    return Err(EngineError::call(
                        "XGBoosterUpdateOneIter",
                        format!("label {} must be in [0, num_class)", label),
                    ));
                }
                let mut one_hot = vec![0.0; outputs];
                one_hot[class] = 1.0;
                Ok(Some(one_hot))
            } else {
                Ok(Some(vec![label]))
            }
        })
        .collect()
}

fn weighted_mean<'a, I>(rows: I, outputs: usize) -> Vec<Score>
where
    I: Iterator<Item = (&'a [Score], f64)>,
{
    let mut sums = vec![0.0f64; outputs];
    let mut total = 0.0;
    for (values, weight) in rows {
        for (sum, &value) in sums.iter_mut().zip(values) {
            *sum += weight * value as f64;
        }
        total += weight;
    }
    if total > 0.0 {
        sums.iter().map(|s| (s / total) as Score).collect()
    } else {
        vec![0.0; outputs]
    }
}

/// Absolute correlation between a slot and the training target.
///
/// Missing values count as zero, like a split sending them left.
fn correlation(matrix: &MatrixData, col: usize, targets: &[Option<Vec<Score>>]) -> f64 {
    let pairs: Vec<(f64, f64)> = (0..matrix.rows)
        .filter_map(|row| {
            let x = matrix.row(row)[col];
            let x = if x.is_nan() { 0.0 } else { x };
            let target = targets[row].as_ref()?;
            // Class index for one-hot targets, the value otherwise.
            let y = if target.len() > 1 {
                target.iter().position(|&t| t > 0.0).unwrap_or(0) as f64
            } else {
                target[0] as f64
            };
            Some((x as f64, y))
        })
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        0.0
    } else {
        (cov / (var_x.sqrt() * var_y.sqrt())).abs()
    }
}

fn row_key(row: &[Score]) -> Vec<u32> {
    row.iter()
        .map(|v| if v.is_nan() { u32::MAX } else { v.to_bits() })
        .collect()
}

/// Uniform noise in `[0, 1)`, reproducible per seed.
pub fn noise(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen::<f64>()).collect()
}

/// Numeric features A, B, C and a numeric label `4 * i`.
pub fn regression_table(rows: usize) -> Table {
    TableBuilder::new(rows)
        .add_real("A", |i| i as f64)
        .add_real("B", |i| 2.0 * i as f64)
        .add_real("C", |i| 3.0 * i as f64)
        .add_real("Label", |i| 4.0 * i as f64)
        .add_role("Label", ColumnRole::Label)
        .build()
        .unwrap()
}

/// The five class names used by multi-class fixtures.
pub const FIVE_CLASSES: [&str; 5] = ["One", "Two", "Three", "Four", "Five"];

/// Numeric features and a five-class nominal label cycling through [`FIVE_CLASSES`].
pub fn five_class_table(rows: usize, seed: u64) -> Table {
    let noise = noise(rows, seed);
    TableBuilder::new(rows)
        .add_real("A", |i| i as f64)
        .add_real("B", |i| (i % 5) as f64 * 10.0 + noise[i])
        .add_real("C", |i| 3.0 * i as f64)
        .add_nominal("Label", |i| Some(FIVE_CLASSES[i % 5]))
        .add_role("Label", ColumnRole::Label)
        .build()
        .unwrap()
}

/// Labels of a categorical column, `None` for missing rows.
pub fn labels(column: &xgboost_table::Column) -> Vec<Option<String>> {
    (0..column.len())
        .map(|row| column.value(row).map(str::to_string))
        .collect()
}
