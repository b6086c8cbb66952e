//! Parameter sweeps that trace welfare losses across bias, uncertainty and tax levels.
//!
//! Each sweep returns parallel vectors ready to be written out or plotted by a reporting layer.

use serde::{Deserialize, Serialize};

use crate::analysis::{percent_of, UncertaintyAnalysis};
use crate::error::Result;
use crate::grid::linspace;
use crate::lottery::TaxLottery;
use crate::options::TaxSearchOptions;
use crate::utility::UtilityFunction;

/// Utility loss against the perception bias.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasCurve {
    pub bias: Vec<f64>,
    pub loss: Vec<f64>,
    pub loss_percent: Vec<f64>,
}

/// Percent utility loss of the two uncertain decision rules against the spread of beliefs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyCurve {
    pub sd: Vec<f64>,
    pub loss_percent_eu_max: Vec<f64>,
    pub loss_percent_expected_rule: Vec<f64>,
}

/// Two-worker average welfare against the mean tax rate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TwoWorkerCurve {
    pub tax: Vec<f64>,
    pub welfare_certain: Vec<f64>,
    pub welfare_uncertain: Vec<f64>,
}

/// Optimal tax rates and welfare against the spread of beliefs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimalTaxCurve {
    pub sd: Vec<f64>,
    pub optimal_tax_certain: Vec<f64>,
    pub optimal_tax_uncertain: Vec<f64>,
    pub welfare_certain: Vec<f64>,
    pub welfare_uncertain: Vec<f64>,
}

impl<U: UtilityFunction> UncertaintyAnalysis<U> {
    /// Loss from misperceiving `true_tax` by each of `n_points` biases on `[-bias_max, bias_max]`.
    pub fn bias_curve(
        &self,
        wage: f64,
        true_tax: f64,
        bias_max: f64,
        n_points: usize,
        transfers: f64,
        total_hours: f64,
    ) -> Result<BiasCurve> {
        let mut curve = BiasCurve {
            bias: linspace(-bias_max, bias_max, n_points)?,
            ..BiasCurve::default()
        };
        for &bias in &curve.bias {
            let loss = self.utility_loss_from_bias(wage, true_tax, bias, transfers, total_hours)?;
            curve.loss.push(loss.loss);
            curve.loss_percent.push(loss.loss_percent);
        }
        Ok(curve)
    }

    /// Loss of expected-utility maximization and of the expected-tax rule for `n_points`
    /// spreads on `[0, sd_max]` of the shared five-point lottery around `tax_mean`.
    #[allow(clippy::too_many_arguments)]
    pub fn uncertainty_curve(
        &self,
        wage: f64,
        tax_mean: f64,
        sd_max: f64,
        n_points: usize,
        transfers: f64,
        total_hours: f64,
        grid_points: usize,
    ) -> Result<UncertaintyCurve> {
        let mut curve = UncertaintyCurve {
            sd: linspace(0.0, sd_max, n_points)?,
            ..UncertaintyCurve::default()
        };
        for &sd in &curve.sd {
            let lottery = TaxLottery::symmetric(tax_mean, sd);
            let certain =
                self.expected_utility_with_certainty(wage, &lottery, transfers, total_hours)?;
            let expected_rule =
                self.expected_utility_with_uncertainty(wage, &lottery, transfers, total_hours)?;
            let eu_max = self.expected_utility_with_uncertainty_eu_max(
                wage,
                &lottery,
                transfers,
                total_hours,
                grid_points,
            )?;

            curve
                .loss_percent_eu_max
                .push(percent_of(certain - eu_max.expected_utility, certain));
            curve
                .loss_percent_expected_rule
                .push(percent_of(certain - expected_rule, certain));
        }
        Ok(curve)
    }

    /// Planner welfare of two workers at `n_points` mean tax rates on `[tax_min, tax_max]`,
    /// with the shared five-point lottery of spread `sd` around each rate.
    #[allow(clippy::too_many_arguments)]
    pub fn two_worker_welfare_curve(
        &self,
        wages: (f64, f64),
        tax_min: f64,
        tax_max: f64,
        n_points: usize,
        sd: f64,
        total_hours: f64,
        grid_points: usize,
    ) -> Result<TwoWorkerCurve> {
        let mut curve = TwoWorkerCurve {
            tax: linspace(tax_min, tax_max, n_points)?,
            ..TwoWorkerCurve::default()
        };
        for &tax_rate in &curve.tax {
            let lottery = TaxLottery::symmetric(tax_rate, sd);
            let planner = self.two_worker_planner_misperception(
                wages,
                tax_rate,
                Some(&lottery),
                total_hours,
                grid_points,
            )?;
            curve.welfare_certain.push(planner.welfare_certain);
            curve
                .welfare_uncertain
                .push(planner.expected_welfare_uncertain);
        }
        Ok(curve)
    }

    /// Certain and uncertain optimal-tax searches for `n_points` spreads on `[0, sd_max]`.
    pub fn optimal_tax_curve(
        &self,
        wage_samples: &[f64],
        sd_max: f64,
        n_points: usize,
        search: &TaxSearchOptions,
    ) -> Result<OptimalTaxCurve> {
        let mut curve = OptimalTaxCurve {
            sd: linspace(0.0, sd_max, n_points)?,
            ..OptimalTaxCurve::default()
        };
        for &sd in &curve.sd {
            let results = self.optimal_tax_rate(wage_samples, sd, search)?;
            log::debug!(
                "sd {sd:.3}: optimal tax certain {:.4}, uncertain {:.4}",
                results.optimal_tax_certain,
                results.optimal_tax_uncertain
            );
            curve.optimal_tax_certain.push(results.optimal_tax_certain);
            curve.optimal_tax_uncertain.push(results.optimal_tax_uncertain);
            curve.welfare_certain.push(results.expected_utility_certain);
            curve
                .welfare_uncertain
                .push(results.expected_utility_uncertain);
        }
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utility::CobbDouglasUtility;

    fn analysis() -> UncertaintyAnalysis {
        UncertaintyAnalysis::new(CobbDouglasUtility::new(0.5, 0.5).unwrap())
    }

    #[test]
    fn bias_curve_is_zero_at_the_centre() {
        let curve = analysis()
            .bias_curve(20.0, 0.3, 0.2, 5, 50.0, 24.0)
            .unwrap();
        assert_eq!(curve.bias.len(), 5);
        assert_eq!(curve.bias[2], 0.0);
        assert_eq!(curve.loss[2], 0.0);
        assert!(curve.loss[0] > curve.loss[1]);
        assert!(curve.loss[4] > curve.loss[3]);
    }

    #[test]
    fn uncertainty_curve_starts_without_loss() {
        let curve = analysis()
            .uncertainty_curve(20.0, 0.3, 0.2, 3, 50.0, 24.0, 241)
            .unwrap();
        assert_eq!(curve.sd, vec![0.0, 0.1, 0.2]);
        assert!(curve.loss_percent_expected_rule[0].abs() < 1e-12);
        assert!(curve.loss_percent_expected_rule[2] > curve.loss_percent_expected_rule[1]);
        assert!(curve.loss_percent_eu_max.iter().all(|&loss| loss >= 0.0));
    }

    #[test]
    fn two_worker_curve_tracks_every_rate() {
        let curve = analysis()
            .two_worker_welfare_curve((20.0, 40.0), 0.1, 0.5, 5, 0.1, 24.0, 121)
            .unwrap();
        assert_eq!(curve.tax.len(), 5);
        assert_eq!(curve.welfare_certain.len(), 5);
        assert_eq!(curve.welfare_uncertain.len(), 5);
        assert!(curve.welfare_certain.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn optimal_tax_curve_without_spread_agrees() {
        let wages = [10.0, 20.0, 35.0, 60.0];
        let curve = analysis()
            .optimal_tax_curve(&wages, 0.0, 1, &TaxSearchOptions::new(0.1, 0.5, 5))
            .unwrap();
        assert_eq!(curve.sd, vec![0.0]);
        assert_eq!(curve.optimal_tax_certain, curve.optimal_tax_uncertain);
        assert_eq!(curve.welfare_certain, curve.welfare_uncertain);
    }
}
