//! # Market Data
//!
//! $$
//! P \in \mathbb{R}^{T\times n},\quad P_{t,i} > 0
//! $$
//!
//! Price-series data model and the provider boundary of the pipeline.

use chrono::NaiveDate;
use ndarray::Array2;

use crate::error::AllocationError;
use crate::error::Result;

#[cfg(feature = "yahoo")]
pub mod yahoo;

/// Investable ETF universe with display names, in presentation order.
pub const ETF_UNIVERSE: [(&str, &str); 8] = [
  ("EEM", "iShares MSCI Emerging Markets ETF"),
  ("EFA", "iShares MSCI EAFE (Developed ex-US)"),
  ("GLD", "SPDR Gold Shares"),
  ("HYG", "iShares iBoxx High Yield Corporate Bond"),
  ("LQD", "iShares iBoxx Investment Grade Corporate Bond"),
  ("QQQ", "Invesco QQQ (Nasdaq-100)"),
  ("SPY", "SPDR S&P 500 ETF"),
  ("TLT", "iShares 20+ Year Treasury Bond"),
];

/// Default ticker selection offered to consumers.
pub const DEFAULT_SELECTION: [&str; 4] = ["EFA", "HYG", "LQD", "SPY"];

/// Aligned close-price history for a set of instruments.
///
/// Rows are observation dates in ascending order, columns follow the ticker
/// order used at construction. Every stored close is finite and strictly
/// positive; rows violating that for any instrument are dropped up front so
/// all downstream statistics see the same dates for every column.
#[derive(Clone, Debug)]
pub struct PriceSeries {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  closes: Array2<f64>,
}

impl PriceSeries {
  /// Build a series from pre-validated parts.
  ///
  /// Fails when the matrix shape does not match the tickers/dates, or when
  /// any retained close is non-finite or non-positive.
  pub fn new(tickers: Vec<String>, dates: Vec<NaiveDate>, closes: Array2<f64>) -> Result<Self> {
    if closes.nrows() != dates.len() || closes.ncols() != tickers.len() {
      return Err(AllocationError::Provider(format!(
        "price matrix shape {:?} does not match {} dates x {} tickers",
        closes.dim(),
        dates.len(),
        tickers.len()
      )));
    }

    if closes.iter().any(|p| !p.is_finite() || *p <= 0.0) {
      return Err(AllocationError::Provider(
        "price matrix contains non-finite or non-positive closes".to_string(),
      ));
    }

    Ok(Self {
      tickers,
      dates,
      closes,
    })
  }

  /// Assemble a series from per-date rows, dropping incomplete rows.
  ///
  /// A row survives only when every instrument has a finite, strictly
  /// positive close on that date. Dropping the whole row keeps all columns
  /// aligned on the same dates.
  pub fn from_rows(tickers: Vec<String>, rows: Vec<(NaiveDate, Vec<f64>)>) -> Result<Self> {
    let n = tickers.len();
    let mut dates = Vec::with_capacity(rows.len());
    let mut flat = Vec::with_capacity(rows.len() * n);

    for (date, closes) in rows {
      if closes.len() != n {
        return Err(AllocationError::Provider(format!(
          "row {date} has {} closes for {n} tickers",
          closes.len()
        )));
      }
      if closes.iter().all(|p| p.is_finite() && *p > 0.0) {
        dates.push(date);
        flat.extend_from_slice(&closes);
      }
    }

    let closes = Array2::from_shape_vec((dates.len(), n), flat)
      .map_err(|e| AllocationError::Provider(e.to_string()))?;

    Ok(Self {
      tickers,
      dates,
      closes,
    })
  }

  /// Tickers in column order.
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  /// Observation dates in row order.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Close prices, rows = dates, columns = tickers.
  pub fn closes(&self) -> &Array2<f64> {
    &self.closes
  }

  /// Number of retained observation dates.
  pub fn len(&self) -> usize {
    self.dates.len()
  }

  /// True when no observation survived cleaning.
  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  /// Number of instruments.
  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }
}

/// Source of aligned close-price history.
///
/// Implementations must preserve the requested ticker order in the returned
/// series and must return an empty series (not an error) when the venue has
/// no data for the requested window. One call per request; any caching is
/// the provider's own concern.
pub trait PriceProvider {
  /// Fetch closes for `tickers` from `start` to `end` (latest when `None`).
  fn fetch(
    &self,
    tickers: &[String],
    start: NaiveDate,
    end: Option<NaiveDate>,
  ) -> Result<PriceSeries>;
}

#[cfg(test)]
mod tests {
  use chrono::Datelike;

  use super::*;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[test]
  fn from_rows_keeps_complete_rows() {
    let series = PriceSeries::from_rows(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![
        (d("2024-01-02"), vec![100.0, 50.0]),
        (d("2024-01-03"), vec![101.0, 51.0]),
      ],
    )
    .unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series.n_assets(), 2);
    assert_eq!(series.closes()[[1, 1]], 51.0);
  }

  #[test]
  fn from_rows_drops_gap_rows_for_all_instruments() {
    // One instrument missing five consecutive days: those dates must
    // disappear from every column, not just the gappy one.
    let mut rows = Vec::new();
    for day in 1..=20 {
      let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
      let bbb = if (6..=10).contains(&day) {
        f64::NAN
      } else {
        50.0 + day as f64
      };
      rows.push((date, vec![100.0 + day as f64, bbb]));
    }

    let series =
      PriceSeries::from_rows(vec!["AAA".to_string(), "BBB".to_string()], rows).unwrap();

    assert_eq!(series.len(), 15);
    assert!(series.dates().iter().all(|date| !(6..=10).contains(&date.day())));
  }

  #[test]
  fn from_rows_rejects_ragged_rows() {
    let err = PriceSeries::from_rows(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![(d("2024-01-02"), vec![100.0])],
    )
    .unwrap_err();

    assert!(matches!(err, AllocationError::Provider(_)));
  }

  #[test]
  fn new_rejects_nonpositive_closes() {
    let closes = Array2::from_shape_vec((1, 2), vec![100.0, -1.0]).unwrap();
    let err = PriceSeries::new(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![d("2024-01-02")],
      closes,
    )
    .unwrap_err();

    assert!(matches!(err, AllocationError::Provider(_)));
  }

  #[test]
  fn empty_series_reports_empty() {
    let series = PriceSeries::from_rows(vec!["AAA".to_string()], Vec::new()).unwrap();
    assert!(series.is_empty());
  }
}
