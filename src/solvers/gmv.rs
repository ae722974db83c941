//! # Global Minimum Variance
//!
//! $$
//! \min_{\mathbf{w}}\ \mathbf{w}^\top\Sigma\,\mathbf{w}
//! \quad\text{s.t.}\quad \textstyle\sum_i w_i = 1,\ w_i \ge 0
//! $$
//!
//! Convex quadratic program for the lowest-variance fully-invested portfolio.

use clarabel::algebra::CscMatrix;
use clarabel::solver::SupportedConeT;
use clarabel::solver::SupportedConeT::NonnegativeConeT;
use clarabel::solver::SupportedConeT::ZeroConeT;
use ndarray::Array1;
use ndarray::Array2;

use super::dense_to_csc;
use super::solve_conic;
use crate::conditioner::make_psd;
use crate::error::AllocationError;
use crate::error::Result;

/// Global minimum variance weights.
///
/// Conditions `sigma` internally, then minimizes portfolio variance subject
/// to full investment and, when `allow_short` is off, elementwise
/// non-negativity. With a positive definite `sigma` the optimum is unique;
/// non-optimal solver statuses propagate as errors rather than degrading to
/// a partial weight vector.
pub fn gmv_weights(sigma: &Array2<f64>, allow_short: bool) -> Result<Array1<f64>> {
  let n = sigma.nrows();
  if n == 0 {
    return Err(AllocationError::Infeasible(
      "no instruments selected".to_string(),
    ));
  }

  let p = dense_to_csc(&make_psd(sigma));
  let q = vec![0.0; n];
  let (a, b, cones) = budget_constraints(n, allow_short);

  solve_conic(&p, &q, &a, &b, &cones)
}

/// Full-investment (zero cone) plus optional long-only (nonnegative cone)
/// constraint block, in clarabel's `b - Aw ∈ K` form.
fn budget_constraints(
  n: usize,
  allow_short: bool,
) -> (CscMatrix<f64>, Vec<f64>, Vec<SupportedConeT<f64>>) {
  let mut data = Vec::new();
  let mut indices = Vec::new();
  let mut indptr = vec![0];

  for j in 0..n {
    // Row 0: sum(w) = 1.
    data.push(1.0);
    indices.push(0);

    // Rows 1..=n: -w <= 0 when shorting is forbidden.
    if !allow_short {
      data.push(-1.0);
      indices.push(1 + j);
    }

    indptr.push(data.len());
  }

  let rows = if allow_short { 1 } else { 1 + n };
  let a = CscMatrix::new(rows, n, indptr, indices, data);

  let mut b = vec![1.0];
  let mut cones = vec![ZeroConeT(1)];
  if !allow_short {
    b.extend(std::iter::repeat(0.0).take(n));
    cones.push(NonnegativeConeT(n));
  }

  (a, b, cones)
}
