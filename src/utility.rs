//! Preferences over leisure and consumption.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WelfareError};

/// Capability interface shared by every utility family over `(leisure, consumption)`.
///
/// Closed-form solvers only exist for Cobb-Douglas preferences; they call
/// [`as_cobb_douglas`](UtilityFunction::as_cobb_douglas) and fail with
/// [`WelfareError::NotSupported`] when it returns `None`.
pub trait UtilityFunction: Send + Sync {
    /// Utility of a bundle.
    fn calculate(&self, leisure: f64, consumption: f64) -> f64;

    /// Partial derivative with respect to leisure.
    fn marginal_utility_leisure(&self, leisure: f64, consumption: f64) -> f64;

    /// Partial derivative with respect to consumption.
    fn marginal_utility_consumption(&self, leisure: f64, consumption: f64) -> f64;

    /// Returns the Cobb-Douglas parameters when this is a Cobb-Douglas utility.
    fn as_cobb_douglas(&self) -> Option<&CobbDouglasUtility> {
        None
    }
}

/// Cobb-Douglas utility `U = L^a * C^b`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CobbDouglasUtility {
    leisure_exponent: f64,
    consumption_exponent: f64,
}

impl CobbDouglasUtility {
    /// Creates the utility function; both exponents must be strictly positive.
    pub fn new(leisure_exponent: f64, consumption_exponent: f64) -> Result<Self> {
        if leisure_exponent.is_nan() || leisure_exponent <= 0.0 {
            return Err(WelfareError::invalid_parameter(
                "leisure_exponent",
                leisure_exponent,
            ));
        }
        if consumption_exponent.is_nan() || consumption_exponent <= 0.0 {
            return Err(WelfareError::invalid_parameter(
                "consumption_exponent",
                consumption_exponent,
            ));
        }
        Ok(Self {
            leisure_exponent,
            consumption_exponent,
        })
    }

    /// Exponent on leisure (`a`).
    pub fn leisure_exponent(&self) -> f64 {
        self.leisure_exponent
    }

    /// Exponent on consumption (`b`).
    pub fn consumption_exponent(&self) -> f64 {
        self.consumption_exponent
    }

    /// Elasticity of substitution between leisure and consumption, always 1.
    pub fn elasticity_of_substitution(&self) -> f64 {
        1.0
    }

    /// Marginal rate of substitution `MU_L / MU_C = (a / b) * (C / L)`.
    ///
    /// Callers must guard against `leisure == 0`.
    pub fn marginal_rate_substitution(&self, leisure: f64, consumption: f64) -> f64 {
        (self.leisure_exponent / self.consumption_exponent) * (consumption / leisure)
    }
}

impl UtilityFunction for CobbDouglasUtility {
    /// Returns exactly 0 whenever either argument is 0, independent of the exponents.
    fn calculate(&self, leisure: f64, consumption: f64) -> f64 {
        if leisure == 0.0 || consumption == 0.0 {
            return 0.0;
        }
        leisure.powf(self.leisure_exponent) * consumption.powf(self.consumption_exponent)
    }

    fn marginal_utility_leisure(&self, leisure: f64, consumption: f64) -> f64 {
        if leisure == 0.0 {
            return f64::INFINITY;
        }
        self.leisure_exponent
            * leisure.powf(self.leisure_exponent - 1.0)
            * consumption.powf(self.consumption_exponent)
    }

    fn marginal_utility_consumption(&self, leisure: f64, consumption: f64) -> f64 {
        if consumption == 0.0 {
            return f64::INFINITY;
        }
        self.consumption_exponent
            * leisure.powf(self.leisure_exponent)
            * consumption.powf(self.consumption_exponent - 1.0)
    }

    fn as_cobb_douglas(&self) -> Option<&CobbDouglasUtility> {
        Some(self)
    }
}
