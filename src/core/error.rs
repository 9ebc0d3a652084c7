//! Error handling and error types for xgboost-table.
//!
//! Errors fall into four groups: caller contract violations, conversion
//! failures raised before any native call, failures reported by the native
//! engine, and configuration problems. A cancelled training run is not an
//! error; it is reported as `Ok(None)` by the trainer.

use crate::engine::EngineError;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum XgbTableError {
    /// The caller broke a precondition (empty table, missing label, no features)
    #[error("Contract violation: {message}")]
    ContractViolation { message: String },

    /// The encoded data set cannot be represented by the native engine
    #[error("Conversion error: {message}")]
    Conversion { message: String },

    /// The native engine reported a failure
    #[error("Native engine error: {source}")]
    Native {
        #[from]
        source: EngineError,
    },

    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid learner parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// TOML configuration parsing errors
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    /// JSON configuration parsing errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: std::io::Error,
    },
}

/// Type alias for Results using XgbTableError
pub type Result<T> = std::result::Result<T, XgbTableError>;

impl XgbTableError {
    /// Create a contract violation error
    pub fn contract<S: Into<String>>(message: S) -> Self {
        XgbTableError::ContractViolation {
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion<S: Into<String>>(message: S) -> Self {
        XgbTableError::Conversion {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        XgbTableError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        XgbTableError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Check if retrying the same call could succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers with their own policy.
    pub fn is_recoverable(&self) -> bool {
        match self {
            XgbTableError::ContractViolation { .. } => false,
            XgbTableError::Conversion { .. } => false,
            XgbTableError::Native { .. } => true,
            XgbTableError::Config { .. } => false,
            XgbTableError::InvalidParameter { .. } => false,
            XgbTableError::Toml { .. } => false,
            XgbTableError::Json { .. } => false,
            XgbTableError::IO { .. } => true,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            XgbTableError::ContractViolation { .. } => "contract_violation",
            XgbTableError::Conversion { .. } => "conversion",
            XgbTableError::Native { .. } => "native",
            XgbTableError::Config { .. } => "config",
            XgbTableError::InvalidParameter { .. } => "invalid_parameter",
            XgbTableError::Toml { .. } => "toml",
            XgbTableError::Json { .. } => "json",
            XgbTableError::IO { .. } => "io",
        }
    }
}

/// Return a contract violation unless the condition holds.
#[macro_export]
macro_rules! require {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err($crate::core::error::XgbTableError::contract($msg));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::core::error::XgbTableError::contract(format!($fmt, $($arg)*)));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = XgbTableError::contract("empty table");
        assert_eq!(err.category(), "contract_violation");
        assert!(!err.is_recoverable());

        let err = XgbTableError::conversion("too large");
        assert_eq!(err.category(), "conversion");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_native_error_conversion() {
        let engine_err = EngineError::call("XGBoosterUpdateOneIter", "unknown objective");
        let err: XgbTableError = engine_err.into();
        assert_eq!(err.category(), "native");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("unknown objective"));
    }

    #[test]
    fn test_require_macro() {
        fn check(height: usize) -> Result<()> {
            require!(height > 0, "Training table must not be empty");
            Ok(())
        }

        assert!(check(1).is_ok());
        let err = check(0).unwrap_err();
        assert!(matches!(err, XgbTableError::ContractViolation { .. }));
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_error_display() {
        let err = XgbTableError::invalid_parameter("rounds", "0", "must be at least 1");
        let message = format!("{}", err);
        assert!(message.contains("rounds = 0"));
        assert!(message.contains("must be at least 1"));
    }
}
