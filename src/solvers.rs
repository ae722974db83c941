//! # Solvers
//!
//! $$
//! \mathbf{w}^\* = \operatorname{Solve}(\mu,\Sigma,\text{constraints})
//! $$
//!
//! Strategy tags, solver configuration and the uniform dispatch over the
//! three allocation rules.

use std::fmt::Display;

use clarabel::algebra::CscMatrix;
use clarabel::solver::DefaultSettingsBuilder;
use clarabel::solver::DefaultSolver;
use clarabel::solver::IPSolver;
use clarabel::solver::SolverStatus;
use clarabel::solver::SupportedConeT;
use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray::Array2;

use crate::error::AllocationError;
use crate::error::Result;
use crate::estimator::Estimates;

pub mod erc;
pub mod gmv;
pub mod tangency;

pub use erc::erc_weights;
pub use gmv::gmv_weights;
pub use tangency::tangency_weights;

/// The closed set of supported allocation rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
  /// Global minimum variance.
  Gmv,
  /// Maximum-Sharpe tangency portfolio (convex bounded-risk reformulation).
  Tangency,
  /// Equal risk contribution.
  Erc,
}

impl Strategy {
  /// All strategies, in presentation order.
  pub const ALL: [Self; 3] = [Self::Gmv, Self::Tangency, Self::Erc];

  /// Parse a strategy label, accepting the common synonyms.
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "gmv" | "min-var" | "minvar" | "minimum-variance" => Some(Self::Gmv),
      "tangency" | "max-sharpe" | "maxsharpe" => Some(Self::Tangency),
      "erc" | "risk-parity" | "riskparity" => Some(Self::Erc),
      _ => None,
    }
  }
}

impl Display for Strategy {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Strategy::Gmv => write!(f, "GMV"),
      Strategy::Tangency => write!(f, "Tangency"),
      Strategy::Erc => write!(f, "ERC"),
    }
  }
}

/// Constraint and rate inputs shared by the solvers.
///
/// `risk_free` must be quoted per return period, matching the unit of the
/// mean vector handed to the tangency solver.
#[derive(ImplNew, Clone, Copy, Debug)]
pub struct SolverConfig {
  /// Permit negative weights. Off by default.
  pub allow_short: bool,
  /// Per-period risk-free rate used by the tangency objective.
  pub risk_free: f64,
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      allow_short: false,
      risk_free: 0.0,
    }
  }
}

/// Dispatch one strategy over shared estimates.
///
/// Each arm is a pure function of `(mu, sigma, constraints)`; the match is
/// exhaustive so adding a strategy without wiring a solver fails to compile.
pub fn solve(
  strategy: Strategy,
  estimates: &Estimates,
  config: &SolverConfig,
) -> Result<Array1<f64>> {
  match strategy {
    Strategy::Gmv => gmv::gmv_weights(&estimates.sigma, config.allow_short),
    Strategy::Tangency => tangency::tangency_weights(
      &estimates.mu,
      &estimates.sigma,
      config.risk_free,
      config.allow_short,
    ),
    Strategy::Erc => erc::erc_weights(&estimates.sigma),
  }
}

/// Dense-to-CSC conversion for clarabel, column-major, near-zeros dropped.
pub(crate) fn dense_to_csc(m: &Array2<f64>) -> CscMatrix<f64> {
  let (rows, cols) = m.dim();
  let mut data = Vec::new();
  let mut indices = Vec::new();
  let mut indptr = vec![0];

  for j in 0..cols {
    for i in 0..rows {
      let v = m[[i, j]];
      if v.abs() > 1e-12 {
        data.push(v);
        indices.push(i);
      }
    }
    indptr.push(data.len());
  }

  CscMatrix::new(rows, cols, indptr, indices, data)
}

/// Run clarabel on an assembled conic problem and map its terminal status
/// onto the crate error taxonomy.
pub(crate) fn solve_conic(
  p: &CscMatrix<f64>,
  q: &[f64],
  a: &CscMatrix<f64>,
  b: &[f64],
  cones: &[SupportedConeT<f64>],
) -> Result<Array1<f64>> {
  let settings = DefaultSettingsBuilder::default()
    .verbose(false)
    .build()
    .map_err(|e| AllocationError::DidNotConverge(format!("solver settings: {e}")))?;

  let mut solver = DefaultSolver::new(p, q, a, b, cones, settings)
    .map_err(|e| AllocationError::DidNotConverge(format!("solver setup: {e:?}")))?;

  solver.solve();

  match solver.solution.status {
    SolverStatus::Solved => Ok(Array1::from(solver.solution.x.clone())),
    status @ (SolverStatus::PrimalInfeasible
    | SolverStatus::DualInfeasible
    | SolverStatus::AlmostPrimalInfeasible
    | SolverStatus::AlmostDualInfeasible) => Err(AllocationError::Infeasible(format!(
      "terminal status {status:?}"
    ))),
    status => Err(AllocationError::DidNotConverge(format!(
      "terminal status {status:?}"
    ))),
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  fn fixture() -> Estimates {
    Estimates {
      tickers: vec!["AAA".to_string(), "BBB".to_string()],
      mu: array![0.0004, 0.0001],
      sigma: array![[0.0004, 0.00005], [0.00005, 0.0001]],
    }
  }

  #[test]
  fn dispatch_is_exhaustive_over_strategies() {
    let est = fixture();
    let config = SolverConfig::default();

    for strategy in Strategy::ALL {
      let w = solve(strategy, &est, &config).unwrap();
      let total: f64 = w.sum();
      assert!((total - 1.0).abs() < 1e-6, "{strategy}: weights sum {total}");
    }
  }

  #[test]
  fn strategy_labels_are_stable() {
    assert_eq!(Strategy::Gmv.to_string(), "GMV");
    assert_eq!(Strategy::Tangency.to_string(), "Tangency");
    assert_eq!(Strategy::Erc.to_string(), "ERC");
  }

  #[test]
  fn strategy_parsing_accepts_synonyms() {
    assert_eq!(Strategy::parse("GMV"), Some(Strategy::Gmv));
    assert_eq!(Strategy::parse("max-sharpe"), Some(Strategy::Tangency));
    assert_eq!(Strategy::parse("risk-parity"), Some(Strategy::Erc));
    assert_eq!(Strategy::parse("momentum"), None);
  }

  #[test]
  fn default_config_forbids_shorting() {
    let config = SolverConfig::default();
    assert!(!config.allow_short);
    assert_eq!(config.risk_free, 0.0);
  }
}
