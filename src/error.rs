use thiserror::Error;

/// Unified error type for `taxwelfare` operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WelfareError {
    /// Raised when a model parameter is outside its admissible domain.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The value that was supplied.
        value: f64,
    },

    /// Raised when a closed-form routine is invoked on a utility family it was not derived for.
    #[error("{operation} is only available for Cobb-Douglas utility")]
    NotSupported { operation: &'static str },

    /// Raised when a normal lottery is requested with a scenario count that has no quantile set.
    #[error("no quantile discretization of the normal distribution with {scenarios} scenarios")]
    UnsupportedDiscretization { scenarios: usize },

    /// Raised when paired inputs have incompatible lengths.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required length.
        expected: usize,
        /// The length that was actually supplied.
        found: usize,
    },

    /// Raised when a collection that must be non-empty is empty.
    #[error("{context} must not be empty")]
    EmptyInput { context: &'static str },
}

impl WelfareError {
    /// Helper to format an [`InvalidParameter`](WelfareError::InvalidParameter) error.
    pub fn invalid_parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }

    /// Helper to raise when a closed form is unavailable for the utility family.
    pub fn not_supported(operation: &'static str) -> Self {
        Self::NotSupported { operation }
    }

    /// Helper to format a [`DimensionMismatch`](WelfareError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper for empty samples, lotteries and grids.
    pub fn empty(context: &'static str) -> Self {
        Self::EmptyInput { context }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, WelfareError>;
