//! Wage-sample providers.
//!
//! The welfare routines only consume a slice of positive wages. Where the sample comes from is
//! hidden behind [`WageSampler`]: a seeded log-normal generator is the default, and
//! [`WeightedIncomeWages`] resamples survey-style weighted income records.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::LogNormal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WelfareError};

/// Median hourly wage of the default synthetic population.
pub const DEFAULT_WAGE_MEDIAN: f64 = 20.0;
/// Log-scale dispersion of the default synthetic population.
pub const DEFAULT_WAGE_SIGMA: f64 = 0.5;
/// Hours per year used to convert annual earnings into an hourly wage.
pub const FULL_TIME_HOURS: f64 = 2000.0;

/// Log-mean and log-sigma of the fallback draw when no record has earnings.
const FALLBACK_LOG_MEAN: f64 = 3.0;
const FALLBACK_LOG_SIGMA: f64 = 0.5;

/// Supplies `n` strictly positive hourly wages.
pub trait WageSampler {
    fn sample_wages(&mut self, n: usize) -> Result<Vec<f64>>;
}

/// Log-normal wages with a given median, from a seeded generator.
#[derive(Clone, Debug)]
pub struct LogNormalWages {
    distribution: LogNormal<f64>,
    rng: SmallRng,
}

impl LogNormalWages {
    /// Wages with `ln(wage) ~ N(ln(median), sigma^2)`.
    pub fn new(median: f64, sigma: f64, seed: u64) -> Result<Self> {
        if median.is_nan() || median <= 0.0 {
            return Err(WelfareError::invalid_parameter("wage_median", median));
        }
        let distribution = LogNormal::new(median.ln(), sigma)
            .map_err(|_| WelfareError::invalid_parameter("wage_sigma", sigma))?;
        Ok(Self {
            distribution,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// The default synthetic population: median 20, sigma 0.5.
    pub fn standard(seed: u64) -> Result<Self> {
        Self::new(DEFAULT_WAGE_MEDIAN, DEFAULT_WAGE_SIGMA, seed)
    }
}

impl WageSampler for LogNormalWages {
    fn sample_wages(&mut self, n: usize) -> Result<Vec<f64>> {
        if n == 0 {
            return Err(WelfareError::empty("requested wage sample"));
        }
        Ok((0..n)
            .map(|_| self.distribution.sample(&mut self.rng))
            .collect())
    }
}

/// One weighted observation of annual employment income.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub annual_income: f64,
    /// Population weight of the record.
    pub weight: f64,
}

/// Resamples hourly wages from weighted income records, with replacement.
///
/// Records with non-positive income or weight are not workers and are dropped. When no worker
/// remains the sampler draws log-normal wages instead.
#[derive(Clone, Debug)]
pub struct WeightedIncomeWages {
    hourly_wages: Vec<f64>,
    weights: Vec<f64>,
    index: Option<WeightedIndex<f64>>,
    fallback: LogNormal<f64>,
    rng: SmallRng,
}

impl WeightedIncomeWages {
    /// Builds the sampler, converting income to hourly wages at `hours_per_year`.
    pub fn new(records: &[IncomeRecord], hours_per_year: f64, seed: u64) -> Result<Self> {
        if hours_per_year.is_nan() || hours_per_year <= 0.0 {
            return Err(WelfareError::invalid_parameter(
                "hours_per_year",
                hours_per_year,
            ));
        }

        let (hourly_wages, weights): (Vec<f64>, Vec<f64>) = records
            .iter()
            .filter(|record| record.annual_income > 0.0 && record.weight > 0.0)
            .map(|record| (record.annual_income / hours_per_year, record.weight))
            .unzip();

        let index = if weights.is_empty() {
            log::warn!("no records with positive earnings; falling back to log-normal wages");
            None
        } else {
            let total: f64 = weights.iter().sum();
            Some(
                WeightedIndex::new(&weights)
                    .map_err(|_| WelfareError::invalid_parameter("record weights", total))?,
            )
        };
        let fallback = LogNormal::new(FALLBACK_LOG_MEAN, FALLBACK_LOG_SIGMA)
            .map_err(|_| WelfareError::invalid_parameter("wage_sigma", FALLBACK_LOG_SIGMA))?;

        Ok(Self {
            hourly_wages,
            weights,
            index,
            fallback,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Number of records that count as workers.
    pub fn worker_count(&self) -> usize {
        self.hourly_wages.len()
    }

    /// Weighted mean hourly wage of the workers, if any.
    pub fn weighted_mean(&self) -> Option<f64> {
        if self.weights.is_empty() {
            return None;
        }
        let total: f64 = self.weights.iter().sum();
        let weighted: f64 = self
            .hourly_wages
            .iter()
            .zip(&self.weights)
            .map(|(wage, weight)| wage * weight)
            .sum();
        Some(weighted / total)
    }

    /// Lowest hourly wage whose cumulative weight reaches half the total, if any.
    pub fn weighted_median(&self) -> Option<f64> {
        if self.weights.is_empty() {
            return None;
        }
        let mut pairs: Vec<(f64, f64)> = self
            .hourly_wages
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let half = pairs.iter().map(|(_, weight)| weight).sum::<f64>() / 2.0;
        let mut cumulative = 0.0;
        for (wage, weight) in &pairs {
            cumulative += weight;
            if cumulative >= half {
                return Some(*wage);
            }
        }
        pairs.last().map(|(wage, _)| *wage)
    }
}

impl WageSampler for WeightedIncomeWages {
    fn sample_wages(&mut self, n: usize) -> Result<Vec<f64>> {
        if n == 0 {
            return Err(WelfareError::empty("requested wage sample"));
        }
        let wages: Vec<f64> = match &self.index {
            Some(index) => (0..n)
                .map(|_| self.hourly_wages[index.sample(&mut self.rng)])
                .collect(),
            None => (0..n)
                .map(|_| self.fallback.sample(&mut self.rng))
                .collect(),
        };
        Ok(wages)
    }
}
