//! # Covariance Conditioner
//!
//! $$
//! \Sigma^{+} = V\,\max(\Lambda,\varepsilon)\,V^\top
//! $$
//!
//! Numerical repair of estimated covariance matrices so they are safe to use
//! as quadratic forms in the convex solvers.

use nalgebra::DMatrix;
use ndarray::Array2;

/// Lower bound applied to the eigenvalues of a conditioned covariance matrix.
pub const EIGENVALUE_FLOOR: f64 = 1e-8;

/// Project a claimed covariance matrix onto the symmetric PSD cone.
///
/// Symmetrizes the input, clips every eigenvalue below [`EIGENVALUE_FLOOR`]
/// up to the floor and reconstructs in the original eigenvector basis.
/// Eigenvalues already above the floor pass through unchanged, so this is a
/// correctness-preserving repair rather than a statistical adjustment. The
/// upper triangle of the reconstruction is mirrored, making the output
/// exactly symmetric. Deterministic for a given input up to eigensolver
/// tie-breaking on degenerate spectra.
pub fn make_psd(sigma: &Array2<f64>) -> Array2<f64> {
  let (eigvecs, clipped) = clipped_eigen(sigma);
  let n = sigma.nrows();

  let lambda = DMatrix::from_diagonal(&clipped);
  let rebuilt = &eigvecs * lambda * eigvecs.transpose();

  let mut out = Array2::zeros((n, n));
  for i in 0..n {
    out[[i, i]] = rebuilt[(i, i)];
    for j in (i + 1)..n {
      out[[i, j]] = rebuilt[(i, j)];
      out[[j, i]] = rebuilt[(i, j)];
    }
  }
  out
}

/// Square-root factor `F` of the conditioned matrix, with `F Fᵀ = Σ⁺`.
///
/// Used by the tangency solver to express the bounded-risk constraint
/// `wᵀΣ⁺w ≤ 1` as the second-order cone `‖Fᵀw‖ ≤ 1`.
pub fn psd_factor(sigma: &Array2<f64>) -> Array2<f64> {
  let (eigvecs, clipped) = clipped_eigen(sigma);
  let n = sigma.nrows();

  let mut out = Array2::zeros((n, n));
  for i in 0..n {
    for j in 0..n {
      out[[i, j]] = eigvecs[(i, j)] * clipped[j].sqrt();
    }
  }
  out
}

fn clipped_eigen(sigma: &Array2<f64>) -> (DMatrix<f64>, nalgebra::DVector<f64>) {
  let n = sigma.nrows();
  let sym = DMatrix::from_fn(n, n, |i, j| 0.5 * (sigma[[i, j]] + sigma[[j, i]]));
  let eigen = sym.symmetric_eigen();
  let clipped = eigen.eigenvalues.map(|l| l.max(EIGENVALUE_FLOOR));
  (eigen.eigenvectors, clipped)
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  fn min_eigenvalue(m: &Array2<f64>) -> f64 {
    let n = m.nrows();
    let dm = DMatrix::from_fn(n, n, |i, j| m[[i, j]]);
    dm.symmetric_eigen()
      .eigenvalues
      .iter()
      .cloned()
      .fold(f64::INFINITY, f64::min)
  }

  #[test]
  fn output_is_exactly_symmetric() {
    let sigma = array![[0.04, 0.011], [0.0109, 0.01]];
    let psd = make_psd(&sigma);

    for i in 0..2 {
      for j in 0..2 {
        assert_eq!(psd[[i, j]], psd[[j, i]]);
      }
    }
  }

  #[test]
  fn indefinite_input_is_lifted_to_the_floor() {
    // Eigenvalues 3 and -1: clearly not a valid covariance matrix.
    let sigma = array![[1.0, 2.0], [2.0, 1.0]];
    let psd = make_psd(&sigma);

    assert!(min_eigenvalue(&psd) >= EIGENVALUE_FLOOR - 1e-12);
  }

  #[test]
  fn well_conditioned_input_passes_through() {
    let sigma = array![[0.04, 0.005], [0.005, 0.01]];
    let psd = make_psd(&sigma);

    for i in 0..2 {
      for j in 0..2 {
        assert!((psd[[i, j]] - sigma[[i, j]]).abs() < 1e-12);
      }
    }
  }

  #[test]
  fn factor_reproduces_conditioned_matrix() {
    let sigma = array![[0.04, 0.01, 0.0], [0.01, 0.09, 0.02], [0.0, 0.02, 0.16]];
    let psd = make_psd(&sigma);
    let f = psd_factor(&sigma);
    let rebuilt = f.dot(&f.t());

    for i in 0..3 {
      for j in 0..3 {
        assert!((rebuilt[[i, j]] - psd[[i, j]]).abs() < 1e-10);
      }
    }
  }
}
