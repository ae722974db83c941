//! # Return Estimator
//!
//! $$
//! r_t = \ln\frac{p_t}{p_{t-1}},\qquad \Sigma=\tfrac12(S+S^\top)
//! $$
//!
//! Price-to-return conversion and sample mean/covariance estimation.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView2;
use ndarray::Axis;

use crate::error::AllocationError;
use crate::error::Result;
use crate::market::PriceSeries;

/// Differencing scheme used to turn prices into per-period returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReturnMethod {
  /// Logarithmic differencing, `ln(p_t / p_{t-1})`.
  #[default]
  Log,
  /// Simple percentage differencing, `p_t / p_{t-1} - 1`.
  Simple,
}

/// Sample moments of a return history, indexed by instrument.
///
/// `mu` and `sigma` share the ticker ordering of the series they were
/// estimated from; `sigma` is exactly symmetric.
#[derive(Clone, Debug)]
pub struct Estimates {
  /// Tickers in estimation order.
  pub tickers: Vec<String>,
  /// Sample mean of per-period returns.
  pub mu: Array1<f64>,
  /// Symmetrized sample covariance of per-period returns.
  pub sigma: Array2<f64>,
}

/// Convert a price series into a per-period return matrix.
///
/// The leading observation is consumed by differencing, so the output has
/// one row fewer than the input. The input series is not modified.
pub fn to_returns(prices: &PriceSeries, method: ReturnMethod) -> Result<Array2<f64>> {
  let rows = prices.len();
  if rows < 2 {
    return Err(AllocationError::InsufficientData {
      required: 2,
      actual: rows,
    });
  }

  let closes = prices.closes();
  let n = prices.n_assets();
  let mut returns = Array2::zeros((rows - 1, n));

  for t in 1..rows {
    for i in 0..n {
      let prev = closes[[t - 1, i]];
      let cur = closes[[t, i]];
      returns[[t - 1, i]] = match method {
        ReturnMethod::Log => (cur / prev).ln(),
        ReturnMethod::Simple => cur / prev - 1.0,
      };
    }
  }

  Ok(returns)
}

/// Sample mean vector and symmetrized sample covariance of a return matrix.
///
/// Covariance uses the n-1 denominator. The raw estimate is averaged with
/// its transpose so the result is symmetric to the last bit, which keeps it
/// usable as a quadratic form downstream.
pub fn mean_cov(returns: &ArrayView2<'_, f64>) -> Result<(Array1<f64>, Array2<f64>)> {
  let t = returns.nrows();
  if t < 2 {
    return Err(AllocationError::InsufficientData {
      required: 2,
      actual: t,
    });
  }

  let mu = returns
    .mean_axis(Axis(0))
    .ok_or(AllocationError::InsufficientData {
      required: 2,
      actual: 0,
    })?;

  let centered = returns.to_owned() - &mu;
  let raw = centered.t().dot(&centered) / (t as f64 - 1.0);
  let sigma = symmetrize(&raw);

  Ok((mu, sigma))
}

/// Estimate `mu`/`sigma` for a cleaned price series in one pass.
pub fn estimate(prices: &PriceSeries, method: ReturnMethod) -> Result<Estimates> {
  let returns = to_returns(prices, method)?;
  let (mu, sigma) = mean_cov(&returns.view())?;

  Ok(Estimates {
    tickers: prices.tickers().to_vec(),
    mu,
    sigma,
  })
}

fn symmetrize(m: &Array2<f64>) -> Array2<f64> {
  let n = m.nrows();
  let mut out = Array2::zeros((n, n));
  for i in 0..n {
    out[[i, i]] = m[[i, i]];
    for j in (i + 1)..n {
      let v = 0.5 * (m[[i, j]] + m[[j, i]]);
      out[[i, j]] = v;
      out[[j, i]] = v;
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use ndarray::array;
  use ndarray_rand::rand_distr::Normal;
  use ndarray_rand::RandomExt;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;

  fn series(closes: Vec<Vec<f64>>) -> PriceSeries {
    let tickers: Vec<String> = (0..closes[0].len()).map(|i| format!("T{i}")).collect();
    let rows = closes
      .into_iter()
      .enumerate()
      .map(|(i, row)| {
        (
          NaiveDate::from_num_days_from_ce_opt(739_000 + i as i32).unwrap(),
          row,
        )
      })
      .collect();
    PriceSeries::from_rows(tickers, rows).unwrap()
  }

  #[test]
  fn log_returns_match_closed_form() {
    let prices = series(vec![vec![100.0], vec![110.0]]);
    let rets = to_returns(&prices, ReturnMethod::Log).unwrap();

    assert_eq!(rets.nrows(), 1);
    assert!((rets[[0, 0]] - (1.1_f64).ln()).abs() < 1e-12);
  }

  #[test]
  fn simple_returns_match_closed_form() {
    let prices = series(vec![vec![100.0], vec![110.0]]);
    let rets = to_returns(&prices, ReturnMethod::Simple).unwrap();

    assert!((rets[[0, 0]] - 0.1).abs() < 1e-12);
  }

  #[test]
  fn differencing_consumes_one_row() {
    let prices = series(vec![
      vec![100.0, 50.0],
      vec![101.0, 49.0],
      vec![102.0, 48.5],
    ]);
    let rets = to_returns(&prices, ReturnMethod::Log).unwrap();

    assert_eq!(rets.dim(), (2, 2));
  }

  #[test]
  fn single_observation_is_insufficient() {
    let prices = series(vec![vec![100.0]]);
    let err = to_returns(&prices, ReturnMethod::Log).unwrap_err();

    assert!(matches!(
      err,
      AllocationError::InsufficientData { required: 2, actual: 1 }
    ));
  }

  #[test]
  fn mean_cov_needs_two_return_rows() {
    let rets = array![[0.01, 0.02]];
    let err = mean_cov(&rets.view()).unwrap_err();

    assert!(matches!(err, AllocationError::InsufficientData { .. }));
  }

  #[test]
  fn mean_cov_matches_hand_computation() {
    let rets = array![[0.01, 0.03], [0.03, -0.01]];
    let (mu, sigma) = mean_cov(&rets.view()).unwrap();

    assert!((mu[0] - 0.02).abs() < 1e-12);
    assert!((mu[1] - 0.01).abs() < 1e-12);
    // Sample covariance with ddof = 1.
    assert!((sigma[[0, 0]] - 2e-4).abs() < 1e-12);
    assert!((sigma[[1, 1]] - 8e-4).abs() < 1e-12);
    assert!((sigma[[0, 1]] + 4e-4).abs() < 1e-12);
  }

  #[test]
  fn covariance_is_bitwise_symmetric() {
    let mut rng = StdRng::seed_from_u64(7);
    let rets = Array2::random_using((250, 4), Normal::new(0.0, 0.01).unwrap(), &mut rng);
    let (_, sigma) = mean_cov(&rets.view()).unwrap();

    for i in 0..4 {
      for j in 0..4 {
        assert_eq!(sigma[[i, j]], sigma[[j, i]]);
      }
    }
  }

  #[test]
  fn estimate_preserves_ticker_order() {
    let prices = series(vec![vec![100.0, 50.0], vec![101.0, 50.5], vec![99.0, 51.0]]);
    let est = estimate(&prices, ReturnMethod::Log).unwrap();

    assert_eq!(est.tickers, vec!["T0".to_string(), "T1".to_string()]);
    assert_eq!(est.mu.len(), 2);
    assert_eq!(est.sigma.dim(), (2, 2));
  }
}
