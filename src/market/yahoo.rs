//! # Yahoo Finance Provider
//!
//! $$
//! \text{tickers}\times[\,t_0,t_1\,]\to P
//! $$
//!
//! [`PriceProvider`] backed by the public Yahoo Finance quote history API.
//! Adjusted closes are fetched per ticker, intersected on calendar date and
//! cleaned into one aligned panel.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::NaiveDate;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use yahoo_finance_api::YahooConnector;

use crate::error::AllocationError;
use crate::error::Result;
use crate::market::PriceProvider;
use crate::market::PriceSeries;

/// Price provider over the Yahoo Finance v8 chart endpoint.
///
/// Network access happens inside [`PriceProvider::fetch`] as one blocking
/// call per ticker; there is no caching.
#[derive(Debug, Default)]
pub struct YahooProvider;

impl YahooProvider {
  /// Create a provider.
  pub fn new() -> Self {
    Self
  }
}

impl PriceProvider for YahooProvider {
  fn fetch(
    &self,
    tickers: &[String],
    start: NaiveDate,
    end: Option<NaiveDate>,
  ) -> Result<PriceSeries> {
    let connector =
      YahooConnector::new().map_err(|e| AllocationError::Provider(e.to_string()))?;

    let start_ts = to_offset_datetime(start)?;
    let end_ts = match end {
      Some(date) => to_offset_datetime(date)?,
      None => OffsetDateTime::now_utc(),
    };

    // date -> per-ticker adjusted closes; only dates quoted for every
    // ticker survive the intersection.
    let mut panel: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

    for (idx, ticker) in tickers.iter().enumerate() {
      let response = tokio_test::block_on(connector.get_quote_history(ticker, start_ts, end_ts))
        .map_err(|e| AllocationError::Provider(format!("{ticker}: {e}")))?;
      let quotes = response
        .quotes()
        .map_err(|e| AllocationError::Provider(format!("{ticker}: {e}")))?;

      for quote in quotes {
        let Some(date) = DateTime::from_timestamp(quote.timestamp as i64, 0) else {
          continue;
        };
        let entry = panel
          .entry(date.date_naive())
          .or_insert_with(|| vec![None; tickers.len()]);
        entry[idx] = Some(quote.adjclose);
      }
    }

    let rows = panel
      .into_iter()
      .filter_map(|(date, closes)| {
        let closes: Option<Vec<f64>> = closes.into_iter().collect();
        closes.map(|c| (date, c))
      })
      .collect();

    PriceSeries::from_rows(tickers.to_vec(), rows)
  }
}

fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
  use chrono::Datelike;

  let month = Month::try_from(date.month() as u8)
    .map_err(|e| AllocationError::Provider(e.to_string()))?;
  let date = Date::from_calendar_date(date.year(), month, date.day() as u8)
    .map_err(|e| AllocationError::Provider(e.to_string()))?;

  Ok(date.midnight().assume_utc())
}
