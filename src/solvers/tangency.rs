//! # Tangency Portfolio
//!
//! $$
//! \max_{\mathbf{w}}\ (\mu - r_f)^\top\mathbf{w}
//! \quad\text{s.t.}\quad \mathbf{w}^\top\Sigma\,\mathbf{w}\le 1,\
//! \textstyle\sum_i w_i = 1
//! $$
//!
//! Convex bounded-risk reformulation of the maximum-Sharpe problem.

use clarabel::algebra::CscMatrix;
use clarabel::solver::SupportedConeT;
use clarabel::solver::SupportedConeT::NonnegativeConeT;
use clarabel::solver::SupportedConeT::SecondOrderConeT;
use clarabel::solver::SupportedConeT::ZeroConeT;
use ndarray::Array1;
use ndarray::Array2;

use super::solve_conic;
use crate::conditioner::psd_factor;
use crate::error::AllocationError;
use crate::error::Result;

/// Tangency weights via the bounded-risk convex reformulation.
///
/// The classical Sharpe objective `(μ-rf)ᵀw / √(wᵀΣw)` is not convex, so
/// the solver instead maximizes excess return under a unit risk budget
/// `wᵀΣw ≤ 1`, written as the second-order cone `‖Fᵀw‖ ≤ 1` with the
/// conditioner's factor `F Fᵀ = Σ⁺`. Under the full-investment constraint
/// this picks the same direction on the efficient frontier as Sharpe
/// maximization. `risk_free` must be quoted per period, matching `mu`.
///
/// When every excess return is non-positive the objective legitimately
/// leans on the risk boundary to minimize the loss; that outcome is
/// returned as-is, not reported as an error.
pub fn tangency_weights(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  risk_free: f64,
  allow_short: bool,
) -> Result<Array1<f64>> {
  let n = mu.len();
  if n == 0 {
    return Err(AllocationError::Infeasible(
      "no instruments selected".to_string(),
    ));
  }
  if sigma.nrows() != n || sigma.ncols() != n {
    return Err(AllocationError::Infeasible(format!(
      "mean vector length {n} does not match covariance shape {:?}",
      sigma.dim()
    )));
  }

  let f = psd_factor(sigma);

  // Minimize the negated excess return; the quadratic term is empty.
  let p = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());
  let q: Vec<f64> = mu.iter().map(|&m| -(m - risk_free)).collect();

  let (a, b, cones) = risk_budget_constraints(&f, allow_short);

  solve_conic(&p, &q, &a, &b, &cones)
}

/// Constraint block: full investment (zero cone), optional long-only
/// (nonnegative cone) and the unit risk budget `‖Fᵀw‖ ≤ 1` (second-order
/// cone), assembled in clarabel's `b - Aw ∈ K` form.
fn risk_budget_constraints(
  f: &Array2<f64>,
  allow_short: bool,
) -> (CscMatrix<f64>, Vec<f64>, Vec<SupportedConeT<f64>>) {
  let n = f.nrows();
  // Row layout: budget row, then n long-only rows (optional), then the
  // cone's scalar row (no coefficients) followed by n rows of -Fᵀ.
  let soc_start = if allow_short { 1 } else { 1 + n };
  let rows = soc_start + 1 + n;

  let mut data = Vec::new();
  let mut indices = Vec::new();
  let mut indptr = vec![0];

  for j in 0..n {
    data.push(1.0);
    indices.push(0);

    if !allow_short {
      data.push(-1.0);
      indices.push(1 + j);
    }

    for i in 0..n {
      let v = f[[j, i]];
      if v != 0.0 {
        data.push(-v);
        indices.push(soc_start + 1 + i);
      }
    }

    indptr.push(data.len());
  }

  let a = CscMatrix::new(rows, n, indptr, indices, data);

  let mut b = vec![1.0];
  let mut cones = vec![ZeroConeT(1)];
  if !allow_short {
    b.extend(std::iter::repeat(0.0).take(n));
    cones.push(NonnegativeConeT(n));
  }
  b.push(1.0);
  b.extend(std::iter::repeat(0.0).take(n));
  cones.push(SecondOrderConeT(n + 1));

  (a, b, cones)
}
