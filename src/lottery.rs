//! Discrete tax-rate lotteries describing what a worker believes the tax rate may turn out to be.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Result, WelfareError};
use crate::grid::linspace;

/// Standardized offsets and weights of the five-point lottery approximating a normal belief.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FivePointShape {
    /// Offsets from the mean in units of the standard deviation.
    pub z_scores: [f64; 5],
    /// Probability attached to each offset.
    pub weights: [f64; 5],
}

/// The discretization used by every uncertain computation: `{-1.5, -0.5, 0, 0.5, 1.5}` sigma
/// with weights `{0.1, 0.2, 0.4, 0.2, 0.1}`.
pub const SYMMETRIC_FIVE_POINT: FivePointShape = FivePointShape {
    z_scores: [-1.5, -0.5, 0.0, 0.5, 1.5],
    weights: [0.1, 0.2, 0.4, 0.2, 0.1],
};

/// Lowest and highest quantiles of the equal-weight normal discretization.
const QUANTILE_RANGE: (f64, f64) = (0.1, 0.9);

/// Ordered `(tax rate, probability)` outcomes. Rates are clamped to `[0, 1]` on construction.
///
/// Probabilities are expected to sum to one; this is the caller's contract and is
/// reported through `log` rather than corrected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LotteryOutcomes", into = "LotteryOutcomes")]
pub struct TaxLottery {
    rates: DVector<f64>,
    probabilities: DVector<f64>,
}

/// Wire form of a [`TaxLottery`]. Decoding goes through [`TaxLottery::new`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct LotteryOutcomes {
    rates: Vec<f64>,
    probabilities: Vec<f64>,
}

impl TryFrom<LotteryOutcomes> for TaxLottery {
    type Error = WelfareError;

    fn try_from(outcomes: LotteryOutcomes) -> Result<Self> {
        Self::new(outcomes.rates, outcomes.probabilities)
    }
}

impl From<TaxLottery> for LotteryOutcomes {
    fn from(lottery: TaxLottery) -> Self {
        Self {
            rates: lottery.rates.as_slice().to_vec(),
            probabilities: lottery.probabilities.as_slice().to_vec(),
        }
    }
}

impl TaxLottery {
    /// Builds a lottery from paired rates and probabilities.
    pub fn new(rates: Vec<f64>, probabilities: Vec<f64>) -> Result<Self> {
        if rates.is_empty() {
            return Err(WelfareError::empty("tax lottery"));
        }
        if rates.len() != probabilities.len() {
            return Err(WelfareError::dimension_mismatch(
                "lottery probabilities",
                rates.len(),
                probabilities.len(),
            ));
        }
        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > 1e-8 {
            log::warn!("tax lottery probabilities sum to {total}, not 1");
        }

        let rates = DVector::from_iterator(rates.len(), rates.into_iter().map(clamp_rate));
        Ok(Self {
            rates,
            probabilities: DVector::from_vec(probabilities),
        })
    }

    /// A lottery that pays `rate` with certainty.
    pub fn point_mass(rate: f64) -> Self {
        Self {
            rates: DVector::from_element(1, clamp_rate(rate)),
            probabilities: DVector::from_element(1, 1.0),
        }
    }

    /// The shared five-point lottery centred on `mean` with spread `sigma`.
    pub fn symmetric(mean: f64, sigma: f64) -> Self {
        let shape = SYMMETRIC_FIVE_POINT;
        Self {
            rates: DVector::from_iterator(
                5,
                shape.z_scores.iter().map(|z| clamp_rate(mean + sigma * z)),
            ),
            probabilities: DVector::from_vec(shape.weights.to_vec()),
        }
    }

    /// Equal-weight discretization of `N(mean, std^2)` at evenly spaced quantiles on `[0.1, 0.9]`.
    ///
    /// Quantiles come from the exact inverse normal CDF.
    pub fn normal_quantiles(mean: f64, std: f64, scenarios: usize) -> Result<Self> {
        if scenarios == 0 {
            return Err(WelfareError::UnsupportedDiscretization { scenarios });
        }
        let normal = Normal::new(mean, std)
            .map_err(|_| WelfareError::invalid_parameter("tax_rate_std", std))?;
        let quantiles = linspace(QUANTILE_RANGE.0, QUANTILE_RANGE.1, scenarios)?;
        let rates = quantiles.iter().map(|&q| clamp_rate(normal.inverse_cdf(q)));

        Ok(Self {
            rates: DVector::from_iterator(scenarios, rates),
            probabilities: DVector::from_element(scenarios, 1.0 / scenarios as f64),
        })
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the lottery has no outcomes. Every constructor, decoding included, rejects that.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Clamped tax rates.
    pub fn rates(&self) -> &DVector<f64> {
        &self.rates
    }

    /// Outcome probabilities.
    pub fn probabilities(&self) -> &DVector<f64> {
        &self.probabilities
    }

    /// Probability-weighted mean tax rate.
    pub fn expected_rate(&self) -> f64 {
        self.rates.dot(&self.probabilities)
    }

    /// Iterates over `(rate, probability)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rates
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
    }
}

fn clamp_rate(rate: f64) -> f64 {
    rate.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn rates_are_clamped() {
        let lottery = TaxLottery::new(vec![-0.2, 0.5, 1.4], vec![0.25, 0.5, 0.25]).unwrap();
        assert_eq!(lottery.rates().as_slice(), &[0.0, 0.5, 1.0]);
        assert_relative_eq!(lottery.expected_rate(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let result = TaxLottery::new(vec![0.2, 0.3], vec![1.0]);
        assert!(matches!(
            result,
            Err(WelfareError::DimensionMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
        assert!(matches!(
            TaxLottery::new(vec![], vec![]),
            Err(WelfareError::EmptyInput { .. })
        ));
    }

    #[test]
    fn symmetric_lottery_is_mean_preserving() {
        let lottery = TaxLottery::symmetric(0.3, 0.1);
        assert_eq!(lottery.len(), 5);
        assert_relative_eq!(lottery.rates()[0], 0.15, epsilon = 1e-12);
        assert_relative_eq!(lottery.rates()[4], 0.45, epsilon = 1e-12);
        assert_relative_eq!(lottery.probabilities().sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(lottery.expected_rate(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn normal_quantiles_are_symmetric_about_the_mean() {
        let lottery = TaxLottery::normal_quantiles(0.3, 0.1, 5).unwrap();
        let rates = lottery.rates();
        assert_relative_eq!(rates[2], 0.3, epsilon = 1e-9);
        // Phi^{-1}(0.9) = 1.2815515655446004
        assert_relative_eq!(rates[4], 0.3 + 0.1 * 1.281_551_565_544_600_4, epsilon = 1e-9);
        assert_relative_eq!(rates[0] + rates[4], 0.6, epsilon = 1e-9);
        assert_relative_eq!(lottery.probabilities()[0], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn decoding_clamps_rates() {
        let lottery: TaxLottery =
            serde_json::from_str(r#"{"rates":[1.5,-0.1],"probabilities":[0.5,0.5]}"#).unwrap();
        assert_eq!(lottery.rates().as_slice(), &[1.0, 0.0]);
        assert_relative_eq!(lottery.expected_rate(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn decoding_rejects_malformed_lotteries() {
        let mismatched =
            serde_json::from_str::<TaxLottery>(r#"{"rates":[0.2,0.4],"probabilities":[1.0]}"#);
        assert!(mismatched.is_err());
        let empty = serde_json::from_str::<TaxLottery>(r#"{"rates":[],"probabilities":[]}"#);
        assert!(empty.is_err());
    }

    #[test]
    fn lottery_round_trips_through_json() {
        let lottery = TaxLottery::symmetric(0.3, 0.1);
        let json = serde_json::to_string(&lottery).unwrap();
        let decoded: TaxLottery = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.len(), 5);
        for ((rate, probability), (expected_rate, expected_probability)) in
            decoded.iter().zip(lottery.iter())
        {
            assert_relative_eq!(rate, expected_rate, epsilon = 1e-12);
            assert_relative_eq!(probability, expected_probability, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_scenarios_have_no_discretization() {
        assert_eq!(
            TaxLottery::normal_quantiles(0.3, 0.1, 0),
            Err(WelfareError::UnsupportedDiscretization { scenarios: 0 })
        );
    }
}
