//! Error types for quasi-Newton optimization.
//!
//! Only genuine failures are errors. Rejected curvature pairs, rejected trial
//! steps and a failed line search are regular outcomes of a run and are
//! reported through return values instead.

use thiserror::Error;

/// Errors that can occur while building or running an optimizer.
#[derive(Debug, Clone, Error)]
pub enum OptimizerError {
    /// Dimension mismatch between vectors.
    ///
    /// Raised when a point, gradient or curvature pair does not have the
    /// dimension the store or oracle was built for.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid optimizer configuration.
    #[error("Invalid optimizer configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// A block of the subproblem that must be positive definite is not.
    ///
    /// With the cautious update in place this indicates inconsistent
    /// curvature data and is surfaced rather than retried.
    #[error("Subproblem factorization failed: {reason}")]
    FactorizationFailed {
        /// Which block failed and why
        reason: String,
    },

    /// The dense block system of a direction solver is singular.
    #[error("Singular subproblem: {reason}")]
    SingularSystem {
        /// Description of the singular system
        reason: String,
    },

    /// Non-finite values appeared in a direction or objective value.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// The objective oracle reported a failure.
    #[error("Objective evaluation failed: {reason}")]
    EvaluationFailed {
        /// Description of the failure
        reason: String,
    },
}

impl OptimizerError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create a FactorizationFailed error.
    pub fn factorization_failed<S: Into<String>>(reason: S) -> Self {
        Self::FactorizationFailed {
            reason: reason.into(),
        }
    }

    /// Create a SingularSystem error.
    pub fn singular_system<S: Into<String>>(reason: S) -> Self {
        Self::SingularSystem {
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create an EvaluationFailed error.
    pub fn evaluation_failed<S: Into<String>>(reason: S) -> Self {
        Self::EvaluationFailed {
            reason: reason.into(),
        }
    }
}

/// Result type alias for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;
