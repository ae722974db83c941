//! # Allocation Engine
//!
//! $$
//! P \to (\mu,\Sigma) \to \{\mathbf{w}_{\mathrm{GMV}},
//! \mathbf{w}_{\mathrm{Tan}},\mathbf{w}_{\mathrm{ERC}}\}
//! $$
//!
//! End-to-end orchestration: fetch, estimate, solve the three strategies and
//! evaluate their annualized performance.

use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use ndarray::Array1;
use tracing::debug;
use tracing::info;

use crate::error::AllocationError;
use crate::error::Result;
use crate::estimator;
use crate::estimator::Estimates;
use crate::estimator::ReturnMethod;
use crate::evaluator::portfolio_stats;
use crate::evaluator::PerformanceSummary;
use crate::market::PriceProvider;
use crate::solvers::solve;
use crate::solvers::SolverConfig;
use crate::solvers::Strategy;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Annual risk-free rate assumed when the caller does not override it.
pub const DEFAULT_RISK_FREE_ANNUAL: f64 = 0.01;

/// Request parameters for one allocation run.
#[derive(ImplNew, Clone, Debug)]
pub struct AllocationConfig {
  /// Instruments to allocate over, in presentation order.
  pub tickers: Vec<String>,
  /// First date of the historical window.
  pub start: NaiveDate,
  /// Last date of the window; latest available when `None`.
  pub end: Option<NaiveDate>,
  /// Annual risk-free rate in decimal.
  pub risk_free_annual: f64,
  /// Permit negative weights.
  pub allow_short: bool,
  /// Differencing scheme for the return series.
  pub return_method: ReturnMethod,
}

impl AllocationConfig {
  /// Config with the stock defaults: long-only, 1% annual risk-free rate,
  /// log returns, open-ended window.
  pub fn with_defaults(tickers: Vec<String>, start: NaiveDate) -> Self {
    Self {
      tickers,
      start,
      end: None,
      risk_free_annual: DEFAULT_RISK_FREE_ANNUAL,
      allow_short: false,
      return_method: ReturnMethod::Log,
    }
  }
}

/// One strategy's output: weights plus annualized performance.
#[derive(Clone, Debug)]
pub struct StrategyAllocation {
  /// Which rule produced this allocation.
  pub strategy: Strategy,
  /// Portfolio weights in ticker order, summing to one.
  pub weights: Vec<f64>,
  /// Annualized performance of the weights.
  pub performance: PerformanceSummary,
}

/// Comparative report over all three strategies.
///
/// The report exists only as a complete set: if any single solve fails the
/// whole run fails, so consumers never see two strategies with the third
/// silently missing.
#[derive(Clone, Debug)]
pub struct AllocationReport {
  /// Tickers in weight order.
  pub tickers: Vec<String>,
  /// One entry per strategy, in [`Strategy::ALL`] order.
  pub allocations: Vec<StrategyAllocation>,
}

impl AllocationReport {
  /// Allocation for one strategy.
  pub fn for_strategy(&self, strategy: Strategy) -> Option<&StrategyAllocation> {
    self.allocations.iter().find(|a| a.strategy == strategy)
  }
}

/// Stateless pipeline runner; every run takes all parameters explicitly.
#[derive(Clone, Debug)]
pub struct AllocationEngine {
  config: AllocationConfig,
}

impl AllocationEngine {
  /// Construct an engine bound to `config`.
  #[must_use]
  pub fn new(config: AllocationConfig) -> Self {
    Self { config }
  }

  /// Borrow the engine configuration.
  pub fn config(&self) -> &AllocationConfig {
    &self.config
  }

  /// Fetch prices from `provider` and allocate.
  ///
  /// An empty series from the provider is reported as [`AllocationError::NoData`]
  /// before any estimation starts.
  pub fn run<P: PriceProvider>(&self, provider: &P) -> Result<AllocationReport> {
    let series = provider.fetch(&self.config.tickers, self.config.start, self.config.end)?;
    if series.is_empty() {
      return Err(AllocationError::NoData);
    }

    info!(
      observations = series.len(),
      assets = series.n_assets(),
      "price history fetched"
    );

    let estimates = estimator::estimate(&series, self.config.return_method)?;
    self.allocate(&estimates)
  }

  /// Allocate over already-estimated daily moments.
  ///
  /// Solves the three strategies independently (they share nothing but the
  /// immutable estimates, so the solves run in parallel), then evaluates
  /// each weight vector against annualized moments: `mu * 252`,
  /// `sigma * 252` and the annual risk-free rate. The tangency solve itself
  /// sees the per-day rate, matching the unit of the daily mean vector.
  pub fn allocate(&self, estimates: &Estimates) -> Result<AllocationReport> {
    let solver_config = SolverConfig::new(
      self.config.allow_short,
      self.config.risk_free_annual / TRADING_DAYS,
    );

    let (gmv, (tangency, erc)) = rayon::join(
      || solve(Strategy::Gmv, estimates, &solver_config),
      || {
        rayon::join(
          || solve(Strategy::Tangency, estimates, &solver_config),
          || solve(Strategy::Erc, estimates, &solver_config),
        )
      },
    );

    let mu_annual = &estimates.mu * TRADING_DAYS;
    let sigma_annual = &estimates.sigma * TRADING_DAYS;

    let mut allocations = Vec::with_capacity(Strategy::ALL.len());
    for (strategy, weights) in [
      (Strategy::Gmv, gmv?),
      (Strategy::Tangency, tangency?),
      (Strategy::Erc, erc?),
    ] {
      allocations.push(self.summarize(strategy, weights, &mu_annual, &sigma_annual));
    }

    Ok(AllocationReport {
      tickers: estimates.tickers.clone(),
      allocations,
    })
  }

  fn summarize(
    &self,
    strategy: Strategy,
    weights: Array1<f64>,
    mu_annual: &Array1<f64>,
    sigma_annual: &ndarray::Array2<f64>,
  ) -> StrategyAllocation {
    let performance = portfolio_stats(
      &weights,
      mu_annual,
      sigma_annual,
      self.config.risk_free_annual,
    );
    debug!(%strategy, ?performance, "strategy solved");

    StrategyAllocation {
      strategy,
      weights: weights.to_vec(),
      performance,
    }
  }
}
