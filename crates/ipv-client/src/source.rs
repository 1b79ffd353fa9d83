/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! The data-source contract consumed by the valuation engine.
//!
//! Implementations report "no data" as an empty vector or `None`, and reserve `Err`
//! for transport and provider failures. Callers rely on that split to decide between
//! falling back to defaults and surfacing an error.

use crate::client::FinancialDatasetsClient;
use async_trait::async_trait;
use ipv_core::{Error, Result};
use ipv_models::{
  BalanceSheet, CashFlowStatement, FinancialMetricsSnapshot, IncomeStatement, PriceSnapshot,
  SegmentedRevenues,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Provider of annual statements, segment revenues and market snapshots
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
  /// Annual income statements, most recent first, at most `limit`
  async fn income_statements(&self, ticker: &str, limit: usize) -> Result<Vec<IncomeStatement>>;

  /// Annual balance sheets, most recent first, at most `limit`
  async fn balance_sheets(&self, ticker: &str, limit: usize) -> Result<Vec<BalanceSheet>>;

  /// Annual cash-flow statements, most recent first, at most `limit`
  async fn cash_flow_statements(&self, ticker: &str, limit: usize) -> Result<Vec<CashFlowStatement>>;

  /// Segment revenue disclosures, most recent period first, at most `limit`
  async fn segmented_revenues(&self, ticker: &str, limit: usize) -> Result<Vec<SegmentedRevenues>>;

  /// Latest price, `None` when the provider has no quote
  async fn price_snapshot(&self, ticker: &str) -> Result<Option<PriceSnapshot>>;

  /// Latest valuation ratios, `None` when unavailable
  async fn metrics_snapshot(&self, ticker: &str) -> Result<Option<FinancialMetricsSnapshot>>;

  /// Short name used in logs
  fn name(&self) -> &str;
}

/// Turn a provider 404 into an empty result
fn empty_on_missing<T: Default>(result: Result<T>) -> Result<T> {
  match result {
    Err(Error::DataUnavailable(reason)) => {
      debug!("No data from provider: {}", reason);
      Ok(T::default())
    }
    other => other,
  }
}

#[async_trait]
impl FinancialDataSource for FinancialDatasetsClient {
  async fn income_statements(&self, ticker: &str, limit: usize) -> Result<Vec<IncomeStatement>> {
    let response = empty_on_missing(self.financials().income_statements(ticker, limit).await)?;
    Ok(response.income_statements)
  }

  async fn balance_sheets(&self, ticker: &str, limit: usize) -> Result<Vec<BalanceSheet>> {
    let response = empty_on_missing(self.financials().balance_sheets(ticker, limit).await)?;
    Ok(response.balance_sheets)
  }

  async fn cash_flow_statements(&self, ticker: &str, limit: usize) -> Result<Vec<CashFlowStatement>> {
    let response = empty_on_missing(self.financials().cash_flow_statements(ticker, limit).await)?;
    Ok(response.cash_flow_statements)
  }

  async fn segmented_revenues(&self, ticker: &str, limit: usize) -> Result<Vec<SegmentedRevenues>> {
    let response = empty_on_missing(self.financials().segmented_revenues(ticker, limit).await)?;
    Ok(response.segmented_revenues)
  }

  async fn price_snapshot(&self, ticker: &str) -> Result<Option<PriceSnapshot>> {
    let response = empty_on_missing(self.market().price_snapshot(ticker).await)?;
    Ok(response.snapshot)
  }

  async fn metrics_snapshot(&self, ticker: &str) -> Result<Option<FinancialMetricsSnapshot>> {
    let response = empty_on_missing(self.market().metrics_snapshot(ticker).await)?;
    Ok(response.snapshot)
  }

  fn name(&self) -> &str {
    "financial-datasets"
  }
}

/// Routes calls to a primary source until it runs out of API credits, then to a
/// secondary source for the rest of the process lifetime.
pub struct FallbackDataSource<P, S> {
  primary: P,
  secondary: S,
  switched: AtomicBool,
}

impl<P, S> FallbackDataSource<P, S>
where
  P: FinancialDataSource,
  S: FinancialDataSource,
{
  pub fn new(primary: P, secondary: S) -> Self {
    Self { primary, secondary, switched: AtomicBool::new(false) }
  }

  /// Whether the secondary source is now serving requests
  pub fn is_switched(&self) -> bool {
    self.switched.load(Ordering::Acquire)
  }

  fn switch(&self, error: &Error) {
    if !self.switched.swap(true, Ordering::AcqRel) {
      warn!(
        "{} reported '{}', switching to {} for the remaining requests",
        self.primary.name(),
        error,
        self.secondary.name()
      );
    }
  }
}

macro_rules! with_fallback {
  ($self:ident, $method:ident($($arg:expr),*)) => {{
    if $self.is_switched() {
      return $self.secondary.$method($($arg),*).await;
    }
    match $self.primary.$method($($arg),*).await {
      Err(e @ Error::InsufficientCredits(_)) => {
        $self.switch(&e);
        $self.secondary.$method($($arg),*).await
      }
      other => other,
    }
  }};
}

#[async_trait]
impl<P, S> FinancialDataSource for FallbackDataSource<P, S>
where
  P: FinancialDataSource,
  S: FinancialDataSource,
{
  async fn income_statements(&self, ticker: &str, limit: usize) -> Result<Vec<IncomeStatement>> {
    with_fallback!(self, income_statements(ticker, limit))
  }

  async fn balance_sheets(&self, ticker: &str, limit: usize) -> Result<Vec<BalanceSheet>> {
    with_fallback!(self, balance_sheets(ticker, limit))
  }

  async fn cash_flow_statements(&self, ticker: &str, limit: usize) -> Result<Vec<CashFlowStatement>> {
    with_fallback!(self, cash_flow_statements(ticker, limit))
  }

  async fn segmented_revenues(&self, ticker: &str, limit: usize) -> Result<Vec<SegmentedRevenues>> {
    with_fallback!(self, segmented_revenues(ticker, limit))
  }

  async fn price_snapshot(&self, ticker: &str) -> Result<Option<PriceSnapshot>> {
    with_fallback!(self, price_snapshot(ticker))
  }

  async fn metrics_snapshot(&self, ticker: &str) -> Result<Option<FinancialMetricsSnapshot>> {
    with_fallback!(self, metrics_snapshot(ticker))
  }

  fn name(&self) -> &str {
    if self.is_switched() {
      self.secondary.name()
    } else {
      self.primary.name()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::FixtureDataSource;
  use std::sync::atomic::AtomicUsize;

  /// Source that fails every call with the configured error
  struct FailingSource {
    credits_exhausted: bool,
    calls: AtomicUsize,
  }

  impl FailingSource {
    fn fail(&self) -> Error {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.credits_exhausted {
        Error::InsufficientCredits("Insufficient credits".to_string())
      } else {
        Error::Http("connection reset".to_string())
      }
    }
  }

  #[async_trait]
  impl FinancialDataSource for FailingSource {
    async fn income_statements(&self, _: &str, _: usize) -> Result<Vec<IncomeStatement>> {
      Err(self.fail())
    }
    async fn balance_sheets(&self, _: &str, _: usize) -> Result<Vec<BalanceSheet>> {
      Err(self.fail())
    }
    async fn cash_flow_statements(&self, _: &str, _: usize) -> Result<Vec<CashFlowStatement>> {
      Err(self.fail())
    }
    async fn segmented_revenues(&self, _: &str, _: usize) -> Result<Vec<SegmentedRevenues>> {
      Err(self.fail())
    }
    async fn price_snapshot(&self, _: &str) -> Result<Option<PriceSnapshot>> {
      Err(self.fail())
    }
    async fn metrics_snapshot(&self, _: &str) -> Result<Option<FinancialMetricsSnapshot>> {
      Err(self.fail())
    }
    fn name(&self) -> &str {
      "failing"
    }
  }

  #[tokio::test]
  async fn test_fallback_switches_on_insufficient_credits() {
    let primary = FailingSource { credits_exhausted: true, calls: AtomicUsize::new(0) };
    let source = FallbackDataSource::new(primary, FixtureDataSource::demo().unwrap());

    let statements = source.income_statements("AAPL", 5).await.unwrap();
    assert_eq!(statements.len(), 1);
    assert!(source.is_switched());
    assert_eq!(source.name(), "demo-fixtures");

    // Primary is not consulted again
    source.segmented_revenues("AAPL", 5).await.unwrap();
    assert_eq!(source.primary.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_fallback_keeps_transport_errors() {
    let primary = FailingSource { credits_exhausted: false, calls: AtomicUsize::new(0) };
    let source = FallbackDataSource::new(primary, FixtureDataSource::demo().unwrap());

    let result = source.income_statements("AAPL", 5).await;
    assert!(matches!(result, Err(Error::Http(_))));
    assert!(!source.is_switched());
  }

  #[test]
  fn test_empty_on_missing() {
    let missing: Result<Vec<u8>> = Err(Error::DataUnavailable("404".to_string()));
    assert_eq!(empty_on_missing(missing).unwrap(), Vec::<u8>::new());

    let failed: Result<Vec<u8>> = Err(Error::Http("500".to_string()));
    assert!(empty_on_missing(failed).is_err());
  }
}
