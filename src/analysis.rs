//! Single-worker welfare comparisons under misperceived or uncertain tax rates.
//!
//! Three informational regimes are compared throughout:
//!
//! - **perfect information**: the worker learns the realized tax rate before choosing hours,
//! - **expected-tax rule**: hours are chosen against the lottery's mean rate and consumption is
//!   realized at each actual rate,
//! - **expected-utility maximization**: hours maximize probability-weighted utility over the
//!   lottery, found by a scan over an evenly spaced labor grid.

use serde::{Deserialize, Serialize};

use crate::choice::{ChoiceProblem, OptimalChoice};
use crate::error::Result;
use crate::grid::{argmax_first, linspace};
use crate::lottery::TaxLottery;
use crate::options::AnalysisOptions;
use crate::utility::{CobbDouglasUtility, UtilityFunction};

/// Utility lost by acting on a misperceived tax rate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiasLoss {
    /// Utility under correct perception minus realized utility under the biased choice.
    pub loss: f64,
    /// `loss` as a percentage of the correctly informed utility; zero when that utility is not positive.
    pub loss_percent: f64,
}

/// Utility lost to uncertainty relative to perfect information.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeadweightLoss {
    pub loss: f64,
    pub loss_percent: f64,
}

impl DeadweightLoss {
    /// No loss at all.
    pub const ZERO: Self = Self {
        loss: 0.0,
        loss_percent: 0.0,
    };
}

/// Outcome of expected-utility maximization over the labor grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EuMaxChoice {
    /// Maximized expected utility.
    pub expected_utility: f64,
    /// Grid point attaining it (lowest labor among ties).
    pub labor: f64,
}

/// Entry point for every welfare computation in the crate.
///
/// Holds the worker's preferences and the [`AnalysisOptions`] used by routines whose
/// signatures carry no explicit time endowment or grid size.
#[derive(Clone, Debug)]
pub struct UncertaintyAnalysis<U = CobbDouglasUtility> {
    pub(crate) choice: OptimalChoice<U>,
    pub(crate) options: AnalysisOptions,
}

impl<U: UtilityFunction> UncertaintyAnalysis<U> {
    /// Analysis with default options.
    pub fn new(utility: U) -> Self {
        Self::with_options(utility, AnalysisOptions::default())
    }

    /// Analysis with explicit options.
    pub fn with_options(utility: U, options: AnalysisOptions) -> Self {
        Self {
            choice: OptimalChoice::new(utility),
            options,
        }
    }

    /// The closed-form choice solver.
    pub fn choice_solver(&self) -> &OptimalChoice<U> {
        &self.choice
    }

    /// Options in effect.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Loss from choosing hours against `true_tax + bias` while paying `true_tax`.
    ///
    /// The perceived rate is clamped to `[0, 1]`. A zero bias yields exactly zero loss.
    pub fn utility_loss_from_bias(
        &self,
        wage: f64,
        true_tax: f64,
        bias: f64,
        transfers: f64,
        total_hours: f64,
    ) -> Result<BiasLoss> {
        let perceived_tax = (true_tax + bias).clamp(0.0, 1.0);
        let baseline = self
            .choice
            .indirect_utility(wage, true_tax, transfers, total_hours)?;

        let perceived = self.choice.solve(&ChoiceProblem {
            wage,
            tax_rate: perceived_tax,
            transfers,
            total_hours,
        })?;
        let consumption = wage * (1.0 - true_tax) * perceived.labor + transfers;
        let biased = self
            .choice
            .utility()
            .calculate(perceived.leisure, consumption);

        let loss = baseline - biased;
        Ok(BiasLoss {
            loss,
            loss_percent: percent_of(loss, baseline),
        })
    }

    /// Probability-weighted utility of working `labor` hours before the tax rate is drawn.
    pub fn expected_utility_given_labor(
        &self,
        wage: f64,
        lottery: &TaxLottery,
        transfers: f64,
        labor: f64,
        total_hours: f64,
    ) -> f64 {
        lottery
            .iter()
            .map(|(tax_rate, probability)| {
                probability
                    * self
                        .choice
                        .realized_utility(wage, tax_rate, transfers, labor, total_hours)
            })
            .sum()
    }

    /// Labor on `grid_points` evenly spaced hours in `[0, total_hours]` maximizing expected utility.
    pub fn labor_supply_eu_max(
        &self,
        wage: f64,
        lottery: &TaxLottery,
        transfers: f64,
        total_hours: f64,
        grid_points: usize,
    ) -> Result<f64> {
        let choice = self.expected_utility_with_uncertainty_eu_max(
            wage,
            lottery,
            transfers,
            total_hours,
            grid_points,
        )?;
        Ok(choice.labor)
    }

    /// Maximized expected utility together with the maximizing labor.
    ///
    /// Ties resolve to the lowest labor on the grid.
    pub fn expected_utility_with_uncertainty_eu_max(
        &self,
        wage: f64,
        lottery: &TaxLottery,
        transfers: f64,
        total_hours: f64,
        grid_points: usize,
    ) -> Result<EuMaxChoice> {
        let labor_grid = linspace(0.0, total_hours, grid_points)?;
        let values: Vec<f64> = labor_grid
            .iter()
            .map(|&labor| {
                self.expected_utility_given_labor(wage, lottery, transfers, labor, total_hours)
            })
            .collect();

        // linspace never returns an empty grid
        let best = argmax_first(&values).unwrap_or(0);
        Ok(EuMaxChoice {
            expected_utility: values[best],
            labor: labor_grid[best],
        })
    }

    /// Expected utility under the expected-tax rule.
    ///
    /// Hours come from the closed form at the lottery's mean rate; utility is then averaged
    /// over the realized rates with those hours held fixed.
    pub fn expected_utility_with_uncertainty(
        &self,
        wage: f64,
        lottery: &TaxLottery,
        transfers: f64,
        total_hours: f64,
    ) -> Result<f64> {
        let planned = self.choice.solve(&ChoiceProblem {
            wage,
            tax_rate: lottery.expected_rate(),
            transfers,
            total_hours,
        })?;

        let utility = self.choice.utility();
        Ok(lottery
            .iter()
            .map(|(tax_rate, probability)| {
                let consumption = wage * (1.0 - tax_rate) * planned.labor + transfers;
                probability * utility.calculate(planned.leisure, consumption)
            })
            .sum())
    }

    /// Expected utility when the worker learns the rate before choosing hours.
    pub fn expected_utility_with_certainty(
        &self,
        wage: f64,
        lottery: &TaxLottery,
        transfers: f64,
        total_hours: f64,
    ) -> Result<f64> {
        let mut expected = 0.0;
        for (tax_rate, probability) in lottery.iter() {
            expected += probability
                * self
                    .choice
                    .indirect_utility(wage, tax_rate, transfers, total_hours)?;
        }
        Ok(expected)
    }

    /// Loss of the expected-tax rule against perfect information when the rate is believed to be
    /// `N(tax_rate_mean, tax_rate_std^2)`, discretized into `n_scenarios` equal-weight quantiles.
    pub fn deadweight_loss_from_uncertainty(
        &self,
        wage: f64,
        tax_rate_mean: f64,
        tax_rate_std: f64,
        n_scenarios: usize,
        transfers: f64,
        total_hours: f64,
    ) -> Result<DeadweightLoss> {
        if tax_rate_std == 0.0 {
            return Ok(DeadweightLoss::ZERO);
        }

        let lottery = TaxLottery::normal_quantiles(tax_rate_mean, tax_rate_std, n_scenarios)?;
        let certain = self.expected_utility_with_certainty(wage, &lottery, transfers, total_hours)?;
        let uncertain =
            self.expected_utility_with_uncertainty(wage, &lottery, transfers, total_hours)?;

        let loss = certain - uncertain;
        Ok(DeadweightLoss {
            loss,
            loss_percent: percent_of(loss, certain),
        })
    }
}

/// `value / base * 100`, or zero for a non-positive base.
pub(crate) fn percent_of(value: f64, base: f64) -> f64 {
    if base > 0.0 {
        value / base * 100.0
    } else {
        0.0
    }
}
