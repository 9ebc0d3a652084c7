//! Boundary to the native boosting engine.
//!
//! The engine is handle based: matrices and boosters live on the native side
//! and are referred to by opaque ids. [`OwnedMatrix`] and [`OwnedBooster`]
//! release them on drop, so every exit path frees what it created. All calls
//! must be made while holding the [`EngineLock`].

pub mod guard;
pub mod lock;

pub use guard::{AccessBlocked, AlwaysActive, CancellationFlag, CancellationToken, GuardedMatrix};
pub use lock::{EngineGuard, EngineLock};

use crate::core::types::{ImportanceType, Score};
use ndarray::Array2;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Opaque id of a native data matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixHandle(pub u64);

/// Opaque id of a native booster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoosterHandle(pub u64);

impl fmt::Display for MatrixHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matrix#{}", self.0)
    }
}

impl fmt::Display for BoosterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "booster#{}", self.0)
    }
}

/// Failure reported across the native boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A guarded matrix refused access because its cancellation token fired
    #[error("Matrix access blocked by cancellation")]
    Blocked,

    /// A native call failed
    #[error("{call} failed: {message}")]
    Call {
        call: &'static str,
        message: String,
    },
}

impl EngineError {
    /// Create a failed-call error
    pub fn call<S: Into<String>>(call: &'static str, message: S) -> Self {
        EngineError::Call {
            call,
            message: message.into(),
        }
    }

    /// Whether this error stems from cancellation
    pub fn is_blocked(&self) -> bool {
        matches!(self, EngineError::Blocked)
    }
}

impl From<AccessBlocked> for EngineError {
    fn from(_: AccessBlocked) -> Self {
        EngineError::Blocked
    }
}

/// Result type of native calls
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Float vectors that can be attached to a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatInfo {
    /// Training target
    Label,
    /// Row weights
    Weight,
}

impl fmt::Display for FloatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatInfo::Label => write!(f, "label"),
            FloatInfo::Weight => write!(f, "weight"),
        }
    }
}

/// Anything a native call can read a matrix handle from.
///
/// Engines must call [`MatrixAccess::handle`] each time they touch a matrix;
/// a guarded matrix uses this to stop a running training loop.
pub trait MatrixAccess {
    /// Native handle, or [`AccessBlocked`] if access was revoked
    fn handle(&self) -> Result<MatrixHandle, AccessBlocked>;
}

impl MatrixAccess for MatrixHandle {
    fn handle(&self) -> Result<MatrixHandle, AccessBlocked> {
        Ok(*self)
    }
}

/// Inputs of a native training loop.
pub struct TrainingRequest<'a> {
    /// Engine parameters, passed through verbatim
    pub parameters: &'a HashMap<String, String>,
    /// Maximum number of boosting rounds
    pub rounds: usize,
    /// Stop after this many rounds without improvement on the last watch
    pub early_stopping_rounds: usize,
    /// Training matrix
    pub train: &'a dyn MatrixAccess,
    /// Named evaluation matrices
    pub watches: &'a [(&'a str, &'a dyn MatrixAccess)],
}

impl fmt::Debug for TrainingRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainingRequest")
            .field("parameters", &self.parameters)
            .field("rounds", &self.rounds)
            .field("early_stopping_rounds", &self.early_stopping_rounds)
            .field("watches", &self.watches.iter().map(|(name, _)| *name).collect::<Vec<_>>())
            .finish()
    }
}

/// Native gradient boosting engine.
///
/// Implementations are not required to be reentrant; callers serialize every
/// call through [`EngineLock`].
pub trait NativeEngine: Send + Sync {
    /// Create a dense row-major matrix; NaN marks missing values.
    fn create_matrix(&self, data: &[Score], rows: usize, cols: usize) -> EngineResult<MatrixHandle>;

    /// Attach labels or weights to a matrix.
    fn set_float_info(&self, matrix: MatrixHandle, field: FloatInfo, values: &[Score]) -> EngineResult<()>;

    /// Release a matrix.
    fn free_matrix(&self, matrix: MatrixHandle) -> EngineResult<()>;

    /// Run the boosting loop.
    fn train(&self, request: &TrainingRequest<'_>) -> EngineResult<BoosterHandle>;

    /// Booster version counter; grows by two per completed round.
    fn booster_version(&self, booster: BoosterHandle) -> EngineResult<u32>;

    /// Number of completed rounds, if the engine tracks them.
    fn completed_rounds(&self, _booster: BoosterHandle) -> EngineResult<Option<usize>> {
        Ok(None)
    }

    /// Serialize a booster into an opaque blob.
    fn save_booster(&self, booster: BoosterHandle) -> EngineResult<Vec<u8>>;

    /// Restore a booster from a blob produced by [`NativeEngine::save_booster`].
    fn load_booster(&self, bytes: &[u8]) -> EngineResult<BoosterHandle>;

    /// Raw predictions, one row per matrix row.
    fn predict(&self, booster: BoosterHandle, matrix: MatrixHandle) -> EngineResult<Array2<Score>>;

    /// Per-feature scores keyed by the given feature names.
    fn feature_score(
        &self,
        booster: BoosterHandle,
        feature_names: &[String],
        importance: ImportanceType,
    ) -> EngineResult<HashMap<String, f64>>;

    /// Release a booster.
    fn free_booster(&self, booster: BoosterHandle) -> EngineResult<()>;
}

/// Native matrix released on drop.
pub struct OwnedMatrix<'e> {
    engine: &'e dyn NativeEngine,
    handle: MatrixHandle,
}

impl<'e> OwnedMatrix<'e> {
    /// Create a native matrix from row-major data.
    pub fn create(engine: &'e dyn NativeEngine, data: &[Score], rows: usize, cols: usize) -> EngineResult<Self> {
        let handle = engine.create_matrix(data, rows, cols)?;
        log::trace!("Created {} ({} x {})", handle, rows, cols);
        Ok(OwnedMatrix { engine, handle })
    }

    /// Attach labels or weights.
    pub fn set_float_info(&self, field: FloatInfo, values: &[Score]) -> EngineResult<()> {
        self.engine.set_float_info(self.handle, field, values)
    }

    /// Native handle
    pub fn raw(&self) -> MatrixHandle {
        self.handle
    }
}

impl MatrixAccess for OwnedMatrix<'_> {
    fn handle(&self) -> Result<MatrixHandle, AccessBlocked> {
        Ok(self.handle)
    }
}

impl Drop for OwnedMatrix<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.engine.free_matrix(self.handle) {
            log::warn!("Failed to free {}: {}", self.handle, e);
        }
    }
}

impl fmt::Debug for OwnedMatrix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedMatrix").field(&self.handle).finish()
    }
}

/// Native booster released on drop.
pub struct OwnedBooster<'e> {
    engine: &'e dyn NativeEngine,
    handle: BoosterHandle,
}

impl<'e> OwnedBooster<'e> {
    /// Take ownership of a booster returned by the engine.
    pub fn new(engine: &'e dyn NativeEngine, handle: BoosterHandle) -> Self {
        OwnedBooster { engine, handle }
    }

    /// Restore a booster from its serialized form.
    pub fn load(engine: &'e dyn NativeEngine, bytes: &[u8]) -> EngineResult<Self> {
        let handle = engine.load_booster(bytes)?;
        Ok(OwnedBooster { engine, handle })
    }

    /// Native handle
    pub fn raw(&self) -> BoosterHandle {
        self.handle
    }

    /// Number of completed boosting rounds.
    ///
    /// Engine-reported rounds win; otherwise half the booster version.
    pub fn completed_iterations(&self) -> EngineResult<usize> {
        match self.engine.completed_rounds(self.handle)? {
            Some(rounds) => Ok(rounds),
            None => Ok(self.engine.booster_version(self.handle)? as usize / 2),
        }
    }

    /// Serialize the booster.
    pub fn save(&self) -> EngineResult<Vec<u8>> {
        self.engine.save_booster(self.handle)
    }

    /// Predict raw scores for a matrix.
    pub fn predict(&self, matrix: &OwnedMatrix<'_>) -> EngineResult<Array2<Score>> {
        self.engine.predict(self.handle, matrix.raw())
    }

    /// Per-feature scores.
    pub fn feature_score(
        &self,
        feature_names: &[String],
        importance: ImportanceType,
    ) -> EngineResult<HashMap<String, f64>> {
        self.engine.feature_score(self.handle, feature_names, importance)
    }
}

impl Drop for OwnedBooster<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.engine.free_booster(self.handle) {
            log::warn!("Failed to free {}: {}", self.handle, e);
        }
    }
}

impl fmt::Debug for OwnedBooster<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedBooster").field(&self.handle).finish()
    }
}
