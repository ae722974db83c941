//! # Vedoinvest
//!
//! $$
//! \mathbf{w}^\* = \operatorname{Solve}(\mu,\Sigma,\text{constraints}),
//! \qquad \textstyle\sum_i w_i^\* = 1
//! $$
//!
//! Multi-strategy portfolio allocation over an ETF universe. A raw price
//! history is turned into daily mean/covariance estimates, the covariance is
//! repaired into a valid quadratic form, and three allocation rules are
//! solved side by side:
//!
//! - **GMV** — global minimum variance, a convex quadratic program;
//! - **Tangency** — maximum-Sharpe direction via a convex bounded-risk
//!   reformulation (linear objective, second-order-cone risk budget);
//! - **ERC** — equal risk contribution, a local nonlinear search on the
//!   simplex.
//!
//! The three solves are pure functions of `(mu, sigma, constraints)` with no
//! shared mutable state, and the engine evaluates every result into
//! annualized return/volatility/Sharpe summaries. Price retrieval sits
//! behind the [`market::PriceProvider`] trait; the optional `yahoo` feature
//! ships a Yahoo Finance implementation.

pub mod conditioner;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod evaluator;
pub mod market;
pub mod solvers;

pub use conditioner::make_psd;
pub use conditioner::EIGENVALUE_FLOOR;
pub use engine::AllocationConfig;
pub use engine::AllocationEngine;
pub use engine::AllocationReport;
pub use engine::StrategyAllocation;
pub use engine::DEFAULT_RISK_FREE_ANNUAL;
pub use engine::TRADING_DAYS;
pub use error::AllocationError;
pub use estimator::estimate;
pub use estimator::mean_cov;
pub use estimator::to_returns;
pub use estimator::Estimates;
pub use estimator::ReturnMethod;
pub use evaluator::portfolio_stats;
pub use evaluator::PerformanceSummary;
pub use market::PriceProvider;
pub use market::PriceSeries;
pub use market::DEFAULT_SELECTION;
pub use market::ETF_UNIVERSE;
pub use solvers::erc_weights;
pub use solvers::gmv_weights;
pub use solvers::solve;
pub use solvers::tangency_weights;
pub use solvers::SolverConfig;
pub use solvers::Strategy;
