//! Welfare effects of tax-rate uncertainty on Cobb-Douglas labor supply.
//!
//! A worker splits a fixed time endowment between leisure and labor and consumes after-tax
//! earnings plus a lump-sum transfer. This crate compares what the worker attains under three
//! informational regimes:
//!
//! - perfect knowledge of the tax rate (`choice` module, closed form),
//! - hours chosen against the expected tax rate while paying the realized one,
//! - hours chosen to maximize expected utility over a discrete tax lottery (`analysis` module).
//!
//! On top of these it aggregates welfare over a wage sample, searches for the welfare-optimal
//! tax rate with and without uncertainty, and solves a planner problem in which transfers are
//! rebalanced after the tax rate is drawn (`welfare` module). Wage samples are produced by any
//! [`WageSampler`]; the core never generates them itself.
//!
//! All optimizations are exhaustive grid searches with lowest-index tie-breaks, so every result
//! is deterministic.
//!
//! # Quick start
//!
//! ```no_run
//! use taxwelfare::lottery::TaxLottery;
//! use taxwelfare::wages::{LogNormalWages, WageSampler};
//! use taxwelfare::{CobbDouglasUtility, TaxSearchOptions, UncertaintyAnalysis};
//!
//! let utility = CobbDouglasUtility::new(0.5, 0.5).expect("positive exponents");
//! let analysis = UncertaintyAnalysis::new(utility);
//!
//! let lottery = TaxLottery::symmetric(0.3, 0.1);
//! let certain = analysis
//!     .expected_utility_with_certainty(20.0, &lottery, 50.0, 24.0)
//!     .expect("Cobb-Douglas closed form");
//! let eu_max = analysis
//!     .expected_utility_with_uncertainty_eu_max(20.0, &lottery, 50.0, 24.0, 241)
//!     .expect("non-empty grid");
//! println!("value of information: {}", certain - eu_max.expected_utility);
//!
//! let wages = LogNormalWages::standard(42)
//!     .and_then(|mut sampler| sampler.sample_wages(500))
//!     .expect("synthetic wages");
//! let results = analysis
//!     .optimal_tax_rate(&wages, 0.05, &TaxSearchOptions::default())
//!     .expect("optimal tax search");
//! println!("optimal tax: {} vs {}", results.optimal_tax_certain, results.optimal_tax_uncertain);
//! ```

pub mod analysis;
pub mod choice;
pub mod error;
pub mod grid;
pub mod lottery;
pub mod options;
pub mod sweeps;
pub mod utility;
pub mod wages;
pub mod welfare;

pub use analysis::{BiasLoss, DeadweightLoss, EuMaxChoice, UncertaintyAnalysis};
pub use choice::{Allocation, ChoiceProblem, OptimalChoice};
pub use error::{Result, WelfareError};
pub use lottery::{TaxLottery, SYMMETRIC_FIVE_POINT};
pub use options::{AnalysisOptions, TaxSearchOptions};
pub use utility::{CobbDouglasUtility, UtilityFunction};
pub use wages::WageSampler;
pub use welfare::{PlannerWelfare, UncertaintyResults};
