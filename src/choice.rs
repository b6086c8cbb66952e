//! Closed-form leisure/consumption choice under a linear income tax.
//!
//! The worker solves `max L^a C^b` subject to
//! `C = w (1 - t) (T - L) + v` and `0 <= L <= T`. The first-order condition
//! `a C = b w (1 - t) L` together with the budget constraint yields the
//! interior leisure demand `L* = a (w (1 - t) T + v) / (w (1 - t) (a + b))`,
//! capped at `T`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WelfareError};
use crate::utility::{CobbDouglasUtility, UtilityFunction};

/// A fully specified single-worker choice problem.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoiceProblem {
    /// Gross hourly wage.
    pub wage: f64,
    /// Proportional tax on labor income.
    pub tax_rate: f64,
    /// Lump-sum transfer income.
    pub transfers: f64,
    /// Hours available for leisure and labor.
    pub total_hours: f64,
}

impl ChoiceProblem {
    /// Problem with no transfers over a 24-hour day.
    pub fn new(wage: f64, tax_rate: f64) -> Self {
        Self {
            wage,
            tax_rate,
            transfers: 0.0,
            total_hours: 24.0,
        }
    }

    /// Sets the lump-sum transfer.
    pub fn transfers(mut self, transfers: f64) -> Self {
        self.transfers = transfers;
        self
    }

    /// Sets the time endowment.
    pub fn total_hours(mut self, total_hours: f64) -> Self {
        self.total_hours = total_hours;
        self
    }
}

/// The optimal bundle for a [`ChoiceProblem`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub leisure: f64,
    pub labor: f64,
    pub consumption: f64,
    /// Indirect utility at the optimum.
    pub utility: f64,
}

/// Solves for optimal choices given a utility function.
#[derive(Clone, Debug)]
pub struct OptimalChoice<U = CobbDouglasUtility> {
    utility: U,
}

impl<U: UtilityFunction> OptimalChoice<U> {
    /// Wraps a utility function.
    pub fn new(utility: U) -> Self {
        Self { utility }
    }

    /// Accessor for the underlying utility function.
    pub fn utility(&self) -> &U {
        &self.utility
    }

    /// Cobb-Douglas parameters, or `NotSupported` for any other family.
    pub(crate) fn cobb_douglas(&self, operation: &'static str) -> Result<&CobbDouglasUtility> {
        self.utility
            .as_cobb_douglas()
            .ok_or_else(|| WelfareError::not_supported(operation))
    }

    /// Optimal leisure hours, in `[0, total_hours]`.
    ///
    /// A non-positive net wage leaves no incentive to work and returns the full-leisure corner.
    pub fn optimal_leisure(
        &self,
        wage: f64,
        tax_rate: f64,
        transfers: f64,
        total_hours: f64,
    ) -> Result<f64> {
        let cd = self.cobb_douglas("optimal leisure")?;
        let a = cd.leisure_exponent();
        let b = cd.consumption_exponent();
        let net_wage = wage * (1.0 - tax_rate);

        if net_wage <= 0.0 {
            return Ok(total_hours);
        }

        let uncapped = a * (net_wage * total_hours + transfers) / (net_wage * (a + b));
        Ok(uncapped.min(total_hours))
    }

    /// Hours of labor supplied, `total_hours - optimal_leisure`.
    pub fn labor_supply(
        &self,
        wage: f64,
        tax_rate: f64,
        transfers: f64,
        total_hours: f64,
    ) -> Result<f64> {
        let leisure = self.optimal_leisure(wage, tax_rate, transfers, total_hours)?;
        Ok(total_hours - leisure)
    }

    /// Consumption financed by after-tax earnings and transfers at the optimum.
    pub fn consumption(
        &self,
        wage: f64,
        tax_rate: f64,
        transfers: f64,
        total_hours: f64,
    ) -> Result<f64> {
        let labor = self.labor_supply(wage, tax_rate, transfers, total_hours)?;
        Ok(wage * (1.0 - tax_rate) * labor + transfers)
    }

    /// Utility evaluated at the optimal bundle.
    pub fn indirect_utility(
        &self,
        wage: f64,
        tax_rate: f64,
        transfers: f64,
        total_hours: f64,
    ) -> Result<f64> {
        let allocation = self.solve(&ChoiceProblem {
            wage,
            tax_rate,
            transfers,
            total_hours,
        })?;
        Ok(allocation.utility)
    }

    /// Computes the whole optimal bundle in one pass.
    pub fn solve(&self, problem: &ChoiceProblem) -> Result<Allocation> {
        let leisure = self.optimal_leisure(
            problem.wage,
            problem.tax_rate,
            problem.transfers,
            problem.total_hours,
        )?;
        let labor = problem.total_hours - leisure;
        let consumption = problem.wage * (1.0 - problem.tax_rate) * labor + problem.transfers;
        Ok(Allocation {
            leisure,
            labor,
            consumption,
            utility: self.utility.calculate(leisure, consumption),
        })
    }

    /// Utility realized when `labor` hours are worked and taxed at `tax_rate`.
    ///
    /// Used wherever the labor choice was fixed before the tax rate was known.
    pub fn realized_utility(
        &self,
        wage: f64,
        tax_rate: f64,
        transfers: f64,
        labor: f64,
        total_hours: f64,
    ) -> f64 {
        let consumption = wage * (1.0 - tax_rate) * labor + transfers;
        self.utility.calculate(total_hours - labor, consumption)
    }
}
