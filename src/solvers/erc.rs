//! # Equal Risk Contribution
//!
//! $$
//! \min_{\mathbf{w}\in\Delta}\ \sum_i\left(\mathrm{rc}_i(\mathbf{w})
//! - \overline{\mathrm{rc}}(\mathbf{w})\right)^2,\qquad
//! \mathrm{rc}_i = \frac{w_i(\Sigma\mathbf{w})_i}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}}
//! $$
//!
//! Local nonlinear search for the risk-parity portfolio on the simplex.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use ndarray::array;
use ndarray::Array1;
use ndarray::Array2;

use crate::conditioner::make_psd;
use crate::error::AllocationError;
use crate::error::Result;

const MAX_ITERS: u64 = 10_000;
const SD_TOLERANCE: f64 = 1e-10;

/// Equal-risk-contribution weights.
///
/// Conditions `sigma` internally, then minimizes the squared spread of
/// per-asset risk contributions with a Nelder-Mead search over a softmax
/// reparameterization, which keeps every iterate on the long-only simplex.
/// The search starts once, deterministically, from the uniform portfolio;
/// there are no retries from other seeds. The problem is non-convex, so the
/// result is a local optimum: contributions equalize to well under 1% of
/// portfolio volatility on well-conditioned inputs but only approximately
/// on near-singular or highly correlated ones. An error is raised only when
/// the optimizer itself reports failure.
pub fn erc_weights(sigma: &Array2<f64>) -> Result<Array1<f64>> {
  let n = sigma.nrows();
  if n == 0 {
    return Err(AllocationError::Infeasible(
      "no instruments selected".to_string(),
    ));
  }
  if n == 1 {
    return Ok(array![1.0]);
  }

  let cost = ErcCost {
    sigma: make_psd(sigma),
    n,
  };

  // Vertex zero maps to the uniform portfolio under softmax; the remaining
  // vertices tilt one asset at a time.
  let x0 = vec![0.0; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0);
  for i in 0..n {
    let mut point = vec![0.0; n];
    point[i] = 1.0;
    simplex.push(point);
  }

  let solver = NelderMead::new(simplex)
    .with_sd_tolerance(SD_TOLERANCE)
    .map_err(|e| AllocationError::DidNotConverge(e.to_string()))?;

  let result = Executor::new(cost, solver)
    .configure(|state| state.max_iters(MAX_ITERS))
    .run()
    .map_err(|e| AllocationError::DidNotConverge(e.to_string()))?;

  let best = result
    .state
    .best_param
    .ok_or_else(|| AllocationError::DidNotConverge("no terminal parameter".to_string()))?;

  Ok(Array1::from(softmax(&best)))
}

/// Per-asset risk contributions `wᵢ(Σw)ᵢ/σₚ`; they sum to the portfolio
/// volatility by construction.
pub fn risk_contributions(w: &Array1<f64>, sigma: &Array2<f64>) -> Array1<f64> {
  let sigma_w = sigma.dot(w);
  let port_var = w.dot(&sigma_w);
  if port_var <= 0.0 {
    return Array1::zeros(w.len());
  }

  let sigma_p = port_var.sqrt();
  let mut rc = sigma_w;
  rc.zip_mut_with(w, |m, &wi| *m *= wi);
  rc / sigma_p
}

struct ErcCost {
  sigma: Array2<f64>,
  n: usize,
}

impl CostFunction for ErcCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = Array1::from(softmax(x));
    let sigma_w = self.sigma.dot(&w);
    let port_var = w.dot(&sigma_w);
    if port_var < 1e-30 {
      return Ok(1e10);
    }

    let sigma_p = port_var.sqrt();
    let mean_rc = sigma_p / self.n as f64;

    let mut err = 0.0;
    for i in 0..self.n {
      let rc_i = w[i] * sigma_w[i] / sigma_p;
      err += (rc_i - mean_rc).powi(2);
    }
    Ok(err)
  }
}

fn softmax(x: &[f64]) -> Vec<f64> {
  if x.is_empty() {
    return Vec::new();
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();

  if sum < 1e-15 {
    vec![1.0 / x.len() as f64; x.len()]
  } else {
    exps.iter().map(|&e| e / sum).collect()
  }
}
