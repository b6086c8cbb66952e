//! Configuration structures for the welfare analysis and its grid searches.

use serde::{Deserialize, Serialize};

/// Settings shared by the population-level routines of
/// [`UncertaintyAnalysis`](crate::UncertaintyAnalysis).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Time endowment of every worker.
    pub total_hours: f64,
    /// Number of labor grid points in expected-utility maximization (241 gives 0.1-hour steps over 24 hours).
    pub labor_grid_points: usize,
    /// Spread of the default planner lottery when none is supplied.
    pub planner_sigma: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            total_hours: 24.0,
            labor_grid_points: 241,
            planner_sigma: 0.10,
        }
    }
}

impl AnalysisOptions {
    /// Override the time endowment.
    pub fn with_total_hours(mut self, total_hours: f64) -> Self {
        self.total_hours = total_hours;
        self
    }

    /// Override the expected-utility labor grid; at least one point is kept.
    pub fn with_labor_grid_points(mut self, points: usize) -> Self {
        self.labor_grid_points = points.max(1);
        self
    }

    /// Override the default planner lottery spread.
    pub fn with_planner_sigma(mut self, sigma: f64) -> Self {
        self.planner_sigma = sigma;
        self
    }
}

/// Range and resolution of the optimal-tax grid search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxSearchOptions {
    pub lower: f64,
    pub upper: f64,
    pub grid_points: usize,
}

impl Default for TaxSearchOptions {
    fn default() -> Self {
        Self {
            lower: 0.1,
            upper: 0.5,
            grid_points: 50,
        }
    }
}

impl TaxSearchOptions {
    /// Search `grid_points` evenly spaced rates on `[lower, upper]`.
    pub fn new(lower: f64, upper: f64, grid_points: usize) -> Self {
        Self {
            lower,
            upper,
            grid_points,
        }
    }

    /// Override the search range while keeping the resolution.
    pub fn with_range(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Override the number of candidate tax rates.
    pub fn with_grid_points(mut self, grid_points: usize) -> Self {
        self.grid_points = grid_points;
        self
    }
}
