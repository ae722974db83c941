//! # Performance Evaluator
//!
//! $$
//! \mu_p=\mathbf{w}^\top\mu,\quad \sigma_p=\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}},
//! \quad S=\frac{\mu_p-r_f}{\sigma_p}
//! $$

use ndarray::Array1;
use ndarray::Array2;

/// Summary statistics for a weight vector, in decimal units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerformanceSummary {
  /// Expected portfolio return `wᵀμ`.
  pub expected_return: f64,
  /// Portfolio volatility `√(wᵀΣw)`.
  pub volatility: f64,
  /// Sharpe ratio; zero by convention when volatility is zero.
  pub sharpe: f64,
}

/// Evaluate a weight vector against `(mu, sigma, risk_free)`.
///
/// All inputs must share one period unit (all daily or all annualized); the
/// evaluator performs no scaling of its own. The degenerate zero-volatility
/// case yields Sharpe 0 rather than a division error.
pub fn portfolio_stats(
  w: &Array1<f64>,
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  risk_free: f64,
) -> PerformanceSummary {
  let expected_return = w.dot(mu);
  let volatility = w.dot(&sigma.dot(w)).max(0.0).sqrt();
  let sharpe = if volatility > 0.0 {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  };

  PerformanceSummary {
    expected_return,
    volatility,
    sharpe,
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;
  use crate::solvers::gmv_weights;

  #[test]
  fn stats_match_closed_form() {
    let w = array![0.5, 0.5];
    let mu = array![0.08, 0.04];
    let sigma = array![[0.04, 0.0], [0.0, 0.04]];

    let stats = portfolio_stats(&w, &mu, &sigma, 0.01);

    assert_abs_diff_eq!(stats.expected_return, 0.06, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.volatility, 0.02_f64.sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(
      stats.sharpe,
      0.05 / 0.02_f64.sqrt(),
      epsilon = 1e-12
    );
  }

  #[test]
  fn zero_volatility_defaults_sharpe_to_zero() {
    let w = array![1.0];
    let mu = array![0.05];
    let sigma = array![[0.0]];

    let stats = portfolio_stats(&w, &mu, &sigma, 0.01);

    assert_eq!(stats.volatility, 0.0);
    assert_eq!(stats.sharpe, 0.0);
  }

  #[test]
  fn evaluator_round_trips_the_gmv_variance() {
    // Evaluating the GMV weights under the same covariance they were
    // solved with must reproduce w'Σw; catches unit-mismatch bugs.
    let mu = array![0.06, 0.03, 0.05];
    let sigma = array![[0.04, 0.01, 0.0], [0.01, 0.09, 0.02], [0.0, 0.02, 0.16]];
    let w = gmv_weights(&sigma, false).unwrap();

    let stats = portfolio_stats(&w, &mu, &sigma, 0.0);
    let quad = w.dot(&sigma.dot(&w));

    assert_abs_diff_eq!(stats.volatility * stats.volatility, quad, epsilon = 1e-12);
  }
}
