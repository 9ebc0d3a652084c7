//! Core infrastructure module for xgboost-table.
//!
//! - [`types`]: Fundamental data types and enumerations
//! - [`constants`]: Native limits, defaults and injected parameter names
//! - [`error`]: Error types shared by every other module

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{Result, XgbTableError};
pub use types::*;

static LOGGER_INIT: std::sync::Once = std::sync::Once::new();

/// Install the `env_logger` backend for the `log` facade.
///
/// Safe to call repeatedly; a logger installed by the host application wins.
pub fn initialize_logging() {
    LOGGER_INIT.call_once(|| {
        // Try to initialize env_logger, ignore if already initialized
        let _ = env_logger::try_init();
        log::debug!("xgboost-table {} logging initialized", XGBOOST_TABLE_VERSION);
    });
}
