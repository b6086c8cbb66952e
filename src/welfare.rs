//! Population welfare, optimal-tax search and the planner problem with ex-post budget balance.
//!
//! Population routines evaluate agents in parallel with `rayon` but always collect per-agent
//! values in sample order and sum them sequentially, so every result (and every grid-search
//! tie-break) is reproducible bit for bit.

use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{percent_of, UncertaintyAnalysis};
use crate::error::{Result, WelfareError};
use crate::grid::{argmax_first, linspace};
use crate::lottery::TaxLottery;
use crate::options::TaxSearchOptions;
use crate::utility::UtilityFunction;

/// Floor applied to `1 - t` in the closed-form demogrant.
const NET_RATE_FLOOR: f64 = 1e-9;

/// Outcome of an optimal-tax search with and without uncertainty.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyResults {
    /// Welfare at the certain optimum.
    pub expected_utility_certain: f64,
    /// Expected welfare at the uncertain optimum.
    pub expected_utility_uncertain: f64,
    /// Certain optimum welfare minus uncertain optimum welfare.
    pub deadweight_loss: f64,
    pub deadweight_loss_percent: f64,
    pub optimal_tax_certain: f64,
    pub optimal_tax_uncertain: f64,
    /// Value of resolving the uncertainty, equal to the deadweight loss.
    pub welfare_gain_from_information: f64,
}

/// Planner comparison of perfect information against tax uncertainty.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerWelfare {
    pub welfare_certain: f64,
    pub expected_welfare_uncertain: f64,
    /// `welfare_certain - expected_welfare_uncertain`.
    pub welfare_loss: f64,
}

impl<U: UtilityFunction> UncertaintyAnalysis<U> {
    /// Mean indirect utility of the sample at `tax_rate`.
    ///
    /// With `redistribute`, revenue raised from the hours each agent works without transfers is
    /// paid back as an equal per-capita transfer.
    pub fn social_welfare(
        &self,
        tax_rate: f64,
        wage_samples: &[f64],
        redistribute: bool,
    ) -> Result<f64> {
        if wage_samples.is_empty() {
            return Err(WelfareError::empty("wage sample"));
        }
        let total_hours = self.options.total_hours;
        let n = wage_samples.len() as f64;

        let transfers = if redistribute {
            let revenues = wage_samples
                .par_iter()
                .map(|&wage| {
                    self.choice
                        .labor_supply(wage, tax_rate, 0.0, total_hours)
                        .map(|labor| wage * tax_rate * labor)
                })
                .collect::<Result<Vec<f64>>>()?;
            revenues.iter().sum::<f64>() / n
        } else {
            0.0
        };

        let utilities = wage_samples
            .par_iter()
            .map(|&wage| {
                self.choice
                    .indirect_utility(wage, tax_rate, transfers, total_hours)
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(utilities.iter().sum::<f64>() / n)
    }

    /// Searches `search.grid_points` tax rates for the welfare optimum with and without
    /// uncertainty of standard deviation `tax_rate_uncertainty`.
    ///
    /// Under uncertainty each candidate rate is the mean of the shared five-point lottery.
    /// Workers choose hours by expected-utility maximization while expecting the certain
    /// closed-form demogrant; welfare is then realized per scenario with the transfer that the
    /// scenario's actual revenue pays for.
    pub fn optimal_tax_rate(
        &self,
        wage_samples: &[f64],
        tax_rate_uncertainty: f64,
        search: &TaxSearchOptions,
    ) -> Result<UncertaintyResults> {
        if tax_rate_uncertainty.is_nan() || tax_rate_uncertainty < 0.0 {
            return Err(WelfareError::invalid_parameter(
                "tax_rate_uncertainty",
                tax_rate_uncertainty,
            ));
        }
        if wage_samples.is_empty() {
            return Err(WelfareError::empty("wage sample"));
        }
        let tax_grid = linspace(search.lower, search.upper, search.grid_points)?;

        let welfare_certain = tax_grid
            .iter()
            .map(|&tax_rate| self.social_welfare(tax_rate, wage_samples, true))
            .collect::<Result<Vec<f64>>>()?;
        let best_certain = argmax_first(&welfare_certain).unwrap_or(0);
        let optimal_tax_certain = tax_grid[best_certain];
        let max_welfare_certain = welfare_certain[best_certain];
        log::debug!(
            "certain optimum: tax {optimal_tax_certain:.4}, welfare {max_welfare_certain:.6}"
        );

        let (optimal_tax_uncertain, max_welfare_uncertain) = if tax_rate_uncertainty > 0.0 {
            let welfare_uncertain = tax_grid
                .par_iter()
                .map(|&tax_mean| {
                    self.uncertain_welfare(wage_samples, tax_mean, tax_rate_uncertainty)
                })
                .collect::<Result<Vec<f64>>>()?;
            let best = argmax_first(&welfare_uncertain).unwrap_or(0);
            (tax_grid[best], welfare_uncertain[best])
        } else {
            (optimal_tax_certain, max_welfare_certain)
        };
        log::debug!(
            "uncertain optimum (sd {tax_rate_uncertainty}): tax {optimal_tax_uncertain:.4}, \
             welfare {max_welfare_uncertain:.6}"
        );

        let deadweight_loss = max_welfare_certain - max_welfare_uncertain;
        Ok(UncertaintyResults {
            expected_utility_certain: max_welfare_certain,
            expected_utility_uncertain: max_welfare_uncertain,
            deadweight_loss,
            deadweight_loss_percent: percent_of(deadweight_loss, max_welfare_certain),
            optimal_tax_certain,
            optimal_tax_uncertain,
            welfare_gain_from_information: deadweight_loss,
        })
    }

    /// Expected welfare at one candidate mean rate of the optimal-tax search.
    fn uncertain_welfare(&self, wage_samples: &[f64], tax_mean: f64, sigma: f64) -> Result<f64> {
        let total_hours = self.options.total_hours;
        let lottery = TaxLottery::symmetric(tax_mean, sigma);
        let expected_transfer =
            self.closed_form_demogrant_certain(wage_samples, tax_mean, total_hours)?;
        let labor = self.eu_max_labor(wage_samples, &lottery, expected_transfer, total_hours)?;
        Ok(ex_post_expected_welfare(
            self,
            wage_samples,
            &labor,
            &lottery,
            total_hours,
        ))
    }

    /// Per-capita transfer that balances the budget at `tax_rate` when every Cobb-Douglas
    /// agent reoptimizes against it:
    ///
    /// `v = (b / (a + b)) T t sum(w) / (n (1 + (a / (a + b)) t / (1 - t)))`
    ///
    /// with `1 - t` floored at `1e-9`.
    pub fn closed_form_demogrant_certain(
        &self,
        wages: &[f64],
        tax_rate: f64,
        total_hours: f64,
    ) -> Result<f64> {
        let cd = self.choice.cobb_douglas("closed-form demogrant")?;
        if wages.is_empty() {
            return Err(WelfareError::empty("wage sample"));
        }
        let a = cd.leisure_exponent();
        let b = cd.consumption_exponent();
        let n = wages.len() as f64;
        let wage_sum: f64 = wages.iter().sum();
        let net_rate = (1.0 - tax_rate).max(NET_RATE_FLOOR);

        let numerator = (b / (a + b)) * total_hours * tax_rate * wage_sum;
        let denominator = n * (1.0 + (a / (a + b)) * tax_rate / net_rate);
        Ok(numerator / denominator)
    }

    /// Two-worker planner comparison; see [`planner_misperception`](Self::planner_misperception).
    pub fn two_worker_planner_misperception(
        &self,
        wages: (f64, f64),
        tax_rate: f64,
        lottery: Option<&TaxLottery>,
        total_hours: f64,
        grid_points: usize,
    ) -> Result<PlannerWelfare> {
        self.planner_misperception(
            &[wages.0, wages.1],
            tax_rate,
            lottery,
            total_hours,
            grid_points,
        )
    }

    /// Compares perfect information at `tax_rate` with uncertainty described by `lottery`.
    ///
    /// Under certainty the planner pays the closed-form demogrant and every agent reoptimizes.
    /// Under uncertainty agents pick hours by expected-utility maximization while expecting that
    /// same demogrant; each scenario then pays out whatever its realized revenue funds. Without
    /// an explicit lottery the shared five-point lottery with the configured planner spread is
    /// used.
    pub fn planner_misperception(
        &self,
        wages: &[f64],
        tax_rate: f64,
        lottery: Option<&TaxLottery>,
        total_hours: f64,
        grid_points: usize,
    ) -> Result<PlannerWelfare> {
        let demogrant = self.closed_form_demogrant_certain(wages, tax_rate, total_hours)?;
        let n = wages.len() as f64;

        let mut welfare_certain = 0.0;
        for &wage in wages {
            welfare_certain += self
                .choice
                .indirect_utility(wage, tax_rate, demogrant, total_hours)?;
        }
        welfare_certain /= n;

        let default_lottery;
        let lottery = match lottery {
            Some(lottery) => lottery,
            None => {
                default_lottery = TaxLottery::symmetric(tax_rate, self.options.planner_sigma);
                &default_lottery
            }
        };

        let labor = wages
            .iter()
            .map(|&wage| {
                self.labor_supply_eu_max(wage, lottery, demogrant, total_hours, grid_points)
            })
            .collect::<Result<Vec<f64>>>()?;
        let expected_welfare_uncertain = ex_post_expected_welfare(
            self,
            wages,
            &DVector::from_vec(labor),
            lottery,
            total_hours,
        );

        Ok(PlannerWelfare {
            welfare_certain,
            expected_welfare_uncertain,
            welfare_loss: welfare_certain - expected_welfare_uncertain,
        })
    }

    /// Expected-utility-maximizing hours of every agent, in sample order.
    fn eu_max_labor(
        &self,
        wages: &[f64],
        lottery: &TaxLottery,
        expected_transfer: f64,
        total_hours: f64,
    ) -> Result<DVector<f64>> {
        let grid_points = self.options.labor_grid_points;
        let labor = wages
            .par_iter()
            .map(|&wage| {
                self.labor_supply_eu_max(
                    wage,
                    lottery,
                    expected_transfer,
                    total_hours,
                    grid_points,
                )
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(DVector::from_vec(labor))
    }
}

/// Probability-weighted mean utility when hours are fixed and each scenario rebalances the
/// budget: the transfer is the realized revenue `t_s * sum(w_i h_i)` divided by population size.
fn ex_post_expected_welfare<U: UtilityFunction>(
    analysis: &UncertaintyAnalysis<U>,
    wages: &[f64],
    labor: &DVector<f64>,
    lottery: &TaxLottery,
    total_hours: f64,
) -> f64 {
    let n = wages.len() as f64;
    let earnings = DVector::from_vec(wages.to_vec()).dot(labor);

    lottery
        .iter()
        .map(|(tax_rate, probability)| {
            let transfer = tax_rate * earnings / n;
            let welfare: f64 = wages
                .iter()
                .zip(labor.iter())
                .map(|(&wage, &hours)| {
                    analysis
                        .choice
                        .realized_utility(wage, tax_rate, transfer, hours, total_hours)
                })
                .sum();
            probability * welfare / n
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::options::AnalysisOptions;
    use crate::utility::CobbDouglasUtility;

    fn analysis() -> UncertaintyAnalysis {
        UncertaintyAnalysis::new(CobbDouglasUtility::new(0.5, 0.5).unwrap())
    }

    fn wages() -> Vec<f64> {
        vec![8.0, 12.0, 16.0, 20.0, 25.0, 32.0, 40.0, 55.0]
    }

    #[test]
    fn demogrant_balances_the_budget() {
        let analysis = analysis();
        let wages = [20.0, 40.0];
        let tax_rate = 0.3;
        let demogrant = analysis
            .closed_form_demogrant_certain(&wages, tax_rate, 24.0)
            .unwrap();

        let revenue: f64 = wages
            .iter()
            .map(|&wage| {
                let labor = analysis
                    .choice_solver()
                    .labor_supply(wage, tax_rate, demogrant, 24.0)
                    .unwrap();
                wage * tax_rate * labor
            })
            .sum();
        assert_relative_eq!(revenue / 2.0, demogrant, epsilon = 1e-9);
    }

    #[test]
    fn demogrant_is_finite_at_full_taxation() {
        let demogrant = analysis()
            .closed_form_demogrant_certain(&[20.0, 40.0], 1.0, 24.0)
            .unwrap();
        assert!(demogrant.is_finite());
        assert!(demogrant >= 0.0);
    }

    #[test]
    fn social_welfare_without_redistribution_is_mean_utility() {
        let analysis = analysis();
        let welfare = analysis.social_welfare(0.0, &[20.0, 40.0], false).unwrap();
        let expected = (analysis
            .choice_solver()
            .indirect_utility(20.0, 0.0, 0.0, 24.0)
            .unwrap()
            + analysis
                .choice_solver()
                .indirect_utility(40.0, 0.0, 0.0, 24.0)
                .unwrap())
            / 2.0;
        assert_relative_eq!(welfare, expected, epsilon = 1e-12);
    }

    #[test]
    fn redistribution_pays_back_zero_transfer_revenue() {
        // Without transfers both agents work 12 hours; at 25% they pay 60 and 120, so each
        // receives 90. With v = 90 the agents take 15 and 13.5 hours of leisure.
        let welfare = analysis()
            .social_welfare(0.25, &[20.0, 40.0], true)
            .unwrap();
        let low = (15.0_f64 * (15.0 * 9.0 + 90.0)).sqrt();
        let high = (13.5_f64 * (30.0 * 10.5 + 90.0)).sqrt();
        assert_relative_eq!(welfare, (low + high) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn scenario_transfers_rebalance_realized_revenue() {
        let analysis = analysis();
        let wages = [20.0, 40.0];
        let labor = DVector::from_vec(vec![10.0, 12.0]);
        let lottery = TaxLottery::new(vec![0.2, 0.4], vec![0.5, 0.5]).unwrap();
        let welfare = ex_post_expected_welfare(&analysis, &wages, &labor, &lottery, 24.0);

        // Earnings are 680, so the scenarios pay 0.2 * 680 / 2 = 68 and 0.4 * 680 / 2 = 136.
        let scenario = |tax_rate: f64, transfer: f64| {
            let low = (14.0_f64 * (20.0 * (1.0 - tax_rate) * 10.0 + transfer)).sqrt();
            let high = (12.0_f64 * (40.0 * (1.0 - tax_rate) * 12.0 + transfer)).sqrt();
            (low + high) / 2.0
        };
        let expected = 0.5 * scenario(0.2, 68.0) + 0.5 * scenario(0.4, 136.0);
        assert_relative_eq!(welfare, expected, epsilon = 1e-9);
    }

    #[test]
    fn point_mass_planner_recovers_certain_welfare() {
        let analysis = analysis();
        let planner = analysis
            .two_worker_planner_misperception(
                (20.0, 40.0),
                0.3,
                Some(&TaxLottery::point_mass(0.3)),
                24.0,
                2401,
            )
            .unwrap();
        // Hours sit on a 0.01-hour grid, so realized revenue only approximates the demogrant.
        assert_relative_eq!(
            planner.expected_welfare_uncertain,
            planner.welfare_certain,
            epsilon = 1e-2
        );
    }

    #[test]
    fn social_welfare_uses_configured_hours() {
        let analysis = UncertaintyAnalysis::with_options(
            CobbDouglasUtility::new(0.5, 0.5).unwrap(),
            AnalysisOptions::default().with_total_hours(16.0),
        );
        // Eight hours of leisure and 16 * 8 of consumption.
        let welfare = analysis.social_welfare(0.2, &[20.0], false).unwrap();
        assert_relative_eq!(welfare, 32.0, epsilon = 1e-9);
    }

    #[test]
    fn planner_spread_is_configurable() {
        let wide = UncertaintyAnalysis::with_options(
            CobbDouglasUtility::new(0.5, 0.5).unwrap(),
            AnalysisOptions::default().with_planner_sigma(0.2),
        );
        let explicit = analysis()
            .two_worker_planner_misperception(
                (20.0, 40.0),
                0.3,
                Some(&TaxLottery::symmetric(0.3, 0.2)),
                24.0,
                121,
            )
            .unwrap();
        let implicit = wide
            .two_worker_planner_misperception((20.0, 40.0), 0.3, None, 24.0, 121)
            .unwrap();
        assert_eq!(explicit, implicit);
    }

    #[test]
    fn social_welfare_rejects_empty_sample() {
        assert!(matches!(
            analysis().social_welfare(0.3, &[], true),
            Err(WelfareError::EmptyInput { .. })
        ));
    }

    #[test]
    fn certain_search_has_no_deadweight_loss() {
        let results = analysis()
            .optimal_tax_rate(&wages(), 0.0, &TaxSearchOptions::new(0.1, 0.5, 9))
            .unwrap();
        assert_eq!(results.deadweight_loss, 0.0);
        assert_eq!(results.optimal_tax_certain, results.optimal_tax_uncertain);
        assert_eq!(
            results.expected_utility_certain,
            results.expected_utility_uncertain
        );
        assert!((0.1..=0.5).contains(&results.optimal_tax_certain));
    }

    #[test]
    fn uncertainty_costs_welfare() {
        let results = analysis()
            .optimal_tax_rate(&wages(), 0.1, &TaxSearchOptions::new(0.1, 0.5, 9))
            .unwrap();
        assert!(results.deadweight_loss > 0.0);
        assert!(results.deadweight_loss_percent > 0.0);
        assert_eq!(
            results.welfare_gain_from_information,
            results.deadweight_loss
        );
        assert!((0.1..=0.5).contains(&results.optimal_tax_uncertain));
    }

    #[test]
    fn negative_uncertainty_is_rejected() {
        let result = analysis().optimal_tax_rate(&wages(), -0.1, &TaxSearchOptions::default());
        assert!(matches!(
            result,
            Err(WelfareError::InvalidParameter {
                name: "tax_rate_uncertainty",
                ..
            })
        ));
    }

    #[test]
    fn two_worker_planner_loses_welfare_to_uncertainty() {
        let planner = analysis()
            .two_worker_planner_misperception((20.0, 40.0), 0.3, None, 24.0, 241)
            .unwrap();
        assert!(planner.welfare_certain >= planner.expected_welfare_uncertain);
        assert!(planner.welfare_loss >= 0.0);
        assert_relative_eq!(
            planner.welfare_loss,
            planner.welfare_certain - planner.expected_welfare_uncertain,
            epsilon = 1e-12
        );
    }

    #[test]
    fn explicit_default_lottery_matches_implicit_one() {
        let analysis = analysis();
        let lottery = TaxLottery::symmetric(0.3, 0.10);
        let explicit = analysis
            .two_worker_planner_misperception((20.0, 40.0), 0.3, Some(&lottery), 24.0, 241)
            .unwrap();
        let implicit = analysis
            .two_worker_planner_misperception((20.0, 40.0), 0.3, None, 24.0, 241)
            .unwrap();
        assert_eq!(explicit, implicit);
    }
}
