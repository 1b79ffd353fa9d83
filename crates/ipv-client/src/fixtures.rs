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

//! Offline data source backed by in-memory fixture companies.
//!
//! [`FixtureDataSource::demo`] loads the bundled demo set (AAPL, MSFT, QCOM, NVDA,
//! TSLA), which carries one annual period of segment revenues and income statement
//! figures per company. Tests build their own companies with [`FixtureCompany`].

use crate::source::FinancialDataSource;
use async_trait::async_trait;
use ipv_core::{Error, Result};
use ipv_models::{
  BalanceSheet, CashFlowStatement, FinancialMetricsSnapshot, IncomeStatement, PriceSnapshot,
  SegmentedRevenues,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const DEMO_COMPANIES_JSON: &str = include_str!("../data/demo_companies.json");

/// Everything the fixture source knows about one company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureCompany {
  #[serde(default)]
  pub name: String,

  #[serde(default)]
  pub income_statements: Vec<IncomeStatement>,

  #[serde(default)]
  pub balance_sheets: Vec<BalanceSheet>,

  #[serde(default)]
  pub cash_flow_statements: Vec<CashFlowStatement>,

  #[serde(default)]
  pub segmented_revenues: Vec<SegmentedRevenues>,

  #[serde(default)]
  pub price: Option<PriceSnapshot>,

  #[serde(default)]
  pub metrics: Option<FinancialMetricsSnapshot>,
}

/// In-memory [`FinancialDataSource`]; unknown tickers yield no data
#[derive(Debug, Clone, Default)]
pub struct FixtureDataSource {
  companies: HashMap<String, FixtureCompany>,
}

impl FixtureDataSource {
  /// Empty source
  pub fn new() -> Self {
    Self::default()
  }

  /// The bundled demo companies
  pub fn demo() -> Result<Self> {
    let companies: HashMap<String, FixtureCompany> = serde_json::from_str(DEMO_COMPANIES_JSON)
      .map_err(|e| Error::Parse(format!("Invalid demo fixture data: {}", e)))?;
    Ok(Self { companies })
  }

  /// Builder: add or replace a company
  pub fn with_company(mut self, ticker: &str, company: FixtureCompany) -> Self {
    self.companies.insert(ticker.to_uppercase(), company);
    self
  }

  /// Tickers with fixture data, sorted
  pub fn tickers(&self) -> Vec<String> {
    let mut tickers: Vec<String> = self.companies.keys().cloned().collect();
    tickers.sort();
    tickers
  }

  pub fn contains(&self, ticker: &str) -> bool {
    self.companies.contains_key(&ticker.to_uppercase())
  }

  /// Company display name
  pub fn company_name(&self, ticker: &str) -> Option<&str> {
    self.company(ticker).map(|c| c.name.as_str())
  }

  fn company(&self, ticker: &str) -> Option<&FixtureCompany> {
    let company = self.companies.get(&ticker.to_uppercase());
    if company.is_none() {
      debug!("No fixture data for {}", ticker);
    }
    company
  }

  fn take<T: Clone>(&self, ticker: &str, limit: usize, pick: fn(&FixtureCompany) -> &Vec<T>) -> Vec<T> {
    self.company(ticker).map(|c| pick(c).iter().take(limit).cloned().collect()).unwrap_or_default()
  }
}

#[async_trait]
impl FinancialDataSource for FixtureDataSource {
  async fn income_statements(&self, ticker: &str, limit: usize) -> Result<Vec<IncomeStatement>> {
    Ok(self.take(ticker, limit, |c| &c.income_statements))
  }

  async fn balance_sheets(&self, ticker: &str, limit: usize) -> Result<Vec<BalanceSheet>> {
    Ok(self.take(ticker, limit, |c| &c.balance_sheets))
  }

  async fn cash_flow_statements(&self, ticker: &str, limit: usize) -> Result<Vec<CashFlowStatement>> {
    Ok(self.take(ticker, limit, |c| &c.cash_flow_statements))
  }

  async fn segmented_revenues(&self, ticker: &str, limit: usize) -> Result<Vec<SegmentedRevenues>> {
    Ok(self.take(ticker, limit, |c| &c.segmented_revenues))
  }

  async fn price_snapshot(&self, ticker: &str) -> Result<Option<PriceSnapshot>> {
    Ok(self.company(ticker).and_then(|c| c.price.clone()))
  }

  async fn metrics_snapshot(&self, ticker: &str) -> Result<Option<FinancialMetricsSnapshot>> {
    Ok(self.company(ticker).and_then(|c| c.metrics.clone()))
  }

  fn name(&self) -> &str {
    "demo-fixtures"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio_test::block_on;

  #[test]
  fn test_demo_fixture_tickers() {
    let source = FixtureDataSource::demo().unwrap();
    assert_eq!(source.tickers(), vec!["AAPL", "MSFT", "NVDA", "QCOM", "TSLA"]);
    assert_eq!(source.company_name("aapl"), Some("Apple Inc."));
  }

  #[test]
  fn test_demo_apple_figures() {
    let source = FixtureDataSource::demo().unwrap();

    let income = block_on(source.income_statements("AAPL", 5)).unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].revenue, Some(391035000000.0));
    assert_eq!(income[0].operating_income, Some(123216000000.0));

    let segments = block_on(source.segmented_revenues("AAPL", 5)).unwrap();
    assert_eq!(segments[0].find_segment_amount("iphone"), Some(201183000000.0));
    assert_eq!(segments[0].find_segment_amount("Wearables"), Some(37005000000.0));
  }

  #[test]
  fn test_unknown_ticker_has_no_data() {
    let source = FixtureDataSource::demo().unwrap();
    assert!(block_on(source.income_statements("ZZZZ", 5)).unwrap().is_empty());
    assert!(block_on(source.price_snapshot("ZZZZ")).unwrap().is_none());
    // Demo companies carry no balance sheets
    assert!(block_on(source.balance_sheets("MSFT", 2)).unwrap().is_empty());
  }

  #[test]
  fn test_limit_is_respected() {
    let company = FixtureCompany {
      income_statements: vec![IncomeStatement::default(); 4],
      ..Default::default()
    };
    let source = FixtureDataSource::new().with_company("abc", company);
    assert_eq!(block_on(source.income_statements("ABC", 2)).unwrap().len(), 2);
    assert!(source.contains("abc"));
  }
}
