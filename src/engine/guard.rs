//! Cancellation-aware access to native matrices.

use crate::core::types::Score;
use crate::engine::{EngineResult, FloatInfo, MatrixAccess, MatrixHandle, NativeEngine, OwnedMatrix};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Access to a guarded matrix was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Access to the native matrix was blocked by its cancellation token")]
pub struct AccessBlocked;

/// Decides whether a long running native operation may continue.
///
/// `true` means continue, `false` means abort.
pub trait CancellationToken: Send + Sync {
    /// Whether work may continue
    fn is_active(&self) -> bool;
}

impl<F> CancellationToken for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_active(&self) -> bool {
        self()
    }
}

/// Token that never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

impl CancellationToken for AlwaysActive {
    fn is_active(&self) -> bool {
        true
    }
}

/// Shareable flag a controlling thread can flip to stop training.
#[derive(Debug, Clone)]
pub struct CancellationFlag {
    active: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// New, active flag
    pub fn new() -> Self {
        CancellationFlag {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Request cancellation; visible to every clone.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Default for CancellationFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken for CancellationFlag {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Native matrix whose handle is only handed out while its token is active.
pub struct GuardedMatrix<'a> {
    matrix: OwnedMatrix<'a>,
    guard: Option<&'a dyn CancellationToken>,
}

impl<'a> GuardedMatrix<'a> {
    /// Create an unguarded native matrix from row-major data.
    pub fn create(engine: &'a dyn NativeEngine, data: &[Score], rows: usize, cols: usize) -> EngineResult<Self> {
        Ok(GuardedMatrix {
            matrix: OwnedMatrix::create(engine, data, rows, cols)?,
            guard: None,
        })
    }

    /// Install or replace the cancellation token; `None` removes it.
    pub fn set_guard(&mut self, guard: Option<&'a dyn CancellationToken>) {
        self.guard = guard;
    }

    /// Attach labels or weights. Not subject to the guard.
    pub fn set_float_info(&self, field: FloatInfo, values: &[Score]) -> EngineResult<()> {
        self.matrix.set_float_info(field, values)
    }
}

impl MatrixAccess for GuardedMatrix<'_> {
    fn handle(&self) -> Result<MatrixHandle, AccessBlocked> {
        match self.guard {
            Some(token) if !token.is_active() => Err(AccessBlocked),
            _ => Ok(self.matrix.raw()),
        }
    }
}

impl fmt::Debug for GuardedMatrix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedMatrix")
            .field("matrix", &self.matrix)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}
