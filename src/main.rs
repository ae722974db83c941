use anyhow::Result;
use chrono::Days;
use chrono::NaiveDate;
use prettytable::row;
use prettytable::Table;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rand_distr::Normal;
use vedoinvest::market::PriceProvider;
use vedoinvest::market::PriceSeries;
use vedoinvest::AllocationConfig;
use vedoinvest::AllocationEngine;
use vedoinvest::DEFAULT_SELECTION;
use vedoinvest::TRADING_DAYS;

/// Demo provider: correlated geometric Brownian price paths, seeded for
/// reproducibility. Swap in `market::yahoo::YahooProvider` (feature `yahoo`)
/// for live data.
struct SimulatedProvider {
  days: usize,
  seed: u64,
}

impl PriceProvider for SimulatedProvider {
  fn fetch(
    &self,
    tickers: &[String],
    start: NaiveDate,
    _end: Option<NaiveDate>,
  ) -> vedoinvest::error::Result<PriceSeries> {
    let n = tickers.len();
    let dt = 1.0 / TRADING_DAYS;
    let mut rng = StdRng::seed_from_u64(self.seed);
    let normal = Normal::new(0.0, 1.0).expect("unit normal");

    let mut closes = vec![100.0; n];
    let mut rows = Vec::with_capacity(self.days);

    for t in 0..self.days {
      let date = start + Days::new(t as u64);
      let common = normal.sample(&mut rng);

      for (i, price) in closes.iter_mut().enumerate() {
        let drift = 0.03 + 0.02 * i as f64;
        let vol = 0.10 + 0.05 * i as f64;
        let shock = 0.4 * common + (1.0f64 - 0.16).sqrt() * normal.sample(&mut rng);
        *price *= ((drift - 0.5 * vol * vol) * dt + vol * dt.sqrt() * shock).exp();
      }

      rows.push((date, closes.clone()));
    }

    PriceSeries::from_rows(tickers.to_vec(), rows)
  }
}

fn main() -> Result<()> {
  let tickers: Vec<String> = DEFAULT_SELECTION.iter().map(|t| t.to_string()).collect();
  let start = NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid date");

  let engine = AllocationEngine::new(AllocationConfig::with_defaults(tickers, start));
  let provider = SimulatedProvider {
    days: 756,
    seed: 42,
  };

  let report = engine.run(&provider)?;

  let mut weights = Table::new();
  weights.add_row(row!["Ticker", "GMV", "Tangency", "ERC"]);
  for (i, ticker) in report.tickers.iter().enumerate() {
    weights.add_row(row![
      ticker,
      format!("{:.4}", report.allocations[0].weights[i]),
      format!("{:.4}", report.allocations[1].weights[i]),
      format!("{:.4}", report.allocations[2].weights[i]),
    ]);
  }

  println!("Portfolio weights");
  weights.printstd();

  let mut performance = Table::new();
  performance.add_row(row!["Strategy", "Return %", "Vol %", "Sharpe"]);
  for allocation in &report.allocations {
    performance.add_row(row![
      allocation.strategy,
      format!("{:.2}", allocation.performance.expected_return * 100.0),
      format!("{:.2}", allocation.performance.volatility * 100.0),
      format!("{:.3}", allocation.performance.sharpe),
    ]);
  }

  println!("\nAnnualized performance");
  performance.printstd();

  Ok(())
}
