//! Error types.
//!
//! Two layers:
//! - `SimError`: numeric-domain failures raised by the model and integrator
//! - `AppError`: what the binary reports (message + process exit code)
//!
//! Exit codes:
//! - 2: invalid input, configuration or I/O
//! - 3: insufficient data
//! - 4: numeric failure

use thiserror::Error;

/// Which adjustment time constant a failing step selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeConstant {
    Decrease,
    Increase,
}

impl std::fmt::Display for TimeConstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeConstant::Decrease => write!(f, "tau_decrease"),
            TimeConstant::Increase => write!(f, "tau_increase"),
        }
    }
}

/// Numeric-domain errors. A run that hits one of these terminates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("division by zero: {which} is 0 at t={time}")]
    ZeroTimeConstant { time: f64, which: TimeConstant },

    #[error("non-finite value in trajectory at t={time}")]
    NonFinite { time: f64 },

    #[error("exogenous series '{name}' has no breakpoints")]
    EmptySeries { name: String },

    #[error("exogenous series '{name}' has a non-finite breakpoint time")]
    NonFiniteBreakpoint { name: String },

    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Prefix the message, keeping the exit code.
    pub fn context(self, what: &str) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{what}: {}", self.message),
        }
    }
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        let exit_code = match err {
            SimError::InvalidHorizon(_) | SimError::EmptySeries { .. } | SimError::NonFiniteBreakpoint { .. } => 2,
            SimError::ZeroTimeConstant { .. } | SimError::NonFinite { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_errors_map_to_exit_code_4() {
        let err: AppError = SimError::ZeroTimeConstant {
            time: 53.5,
            which: TimeConstant::Decrease,
        }
        .into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("tau_decrease"));
    }

    #[test]
    fn context_keeps_exit_code() {
        let err = AppError::new(3, "too few weeks").context("calibration");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "calibration: too few weeks");
    }

    #[test]
    fn config_errors_map_to_exit_code_2() {
        let err: AppError = SimError::InvalidHorizon("end < start".to_string()).into();
        assert_eq!(err.exit_code(), 2);
    }
}
