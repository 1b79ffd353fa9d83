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

//! Equity fair-value cross-check: a five-year DCF plus P/E, P/S and EV/EBITDA multiples.
//!
//! Independent of the IP valuation flow. Used to compare the market price with an
//! intrinsic estimate before trusting IP values derived from the same statements.

use crate::assumptions::DEFAULT_WACC;
use crate::methods::{discount_factor, gordon_terminal_value};
use ipv_client::FinancialDataSource;
use ipv_core::{Error, Result};
use ipv_models::{BalanceSheet, CashFlowStatement, FinancialMetricsSnapshot, IncomeStatement};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const DEFAULT_GROWTH_RATE: f64 = 0.05;
pub const DEFAULT_FAIR_VALUE_TERMINAL_GROWTH: f64 = 0.025;
pub const DCF_PROJECTION_YEARS: u32 = 5;

pub const DEFAULT_PE_MULTIPLE: f64 = 20.0;
pub const MAX_TRUSTED_PE: f64 = 100.0;
pub const PS_MULTIPLE: f64 = 3.0;
pub const EV_EBITDA_MULTIPLE: f64 = 12.0;

const MIN_PROJECTED_GROWTH: f64 = -0.20;
const MAX_PROJECTED_GROWTH: f64 = 0.50;

/// Statement history requested per endpoint
pub const FAIR_VALUE_HISTORY: usize = 5;

/// Caller choices; unset rates are estimated or defaulted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueInputs {
  pub growth_rate: Option<f64>,
  pub terminal_growth: f64,
  pub wacc: Option<f64>,
}

impl Default for FairValueInputs {
  fn default() -> Self {
    Self { growth_rate: None, terminal_growth: DEFAULT_FAIR_VALUE_TERMINAL_GROWTH, wacc: None }
  }
}

/// Everything the cross-check reads, most recent period first
#[derive(Debug, Clone, Default)]
pub struct FairValueData {
  pub income: Vec<IncomeStatement>,
  pub balance: Vec<BalanceSheet>,
  pub cash_flows: Vec<CashFlowStatement>,
  pub metrics: Option<FinancialMetricsSnapshot>,
  pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FairValueMethod {
  Dcf,
  PeMultiple,
  PsMultiple,
  EvEbitda,
}

impl fmt::Display for FairValueMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FairValueMethod::Dcf => write!(f, "DCF"),
      FairValueMethod::PeMultiple => write!(f, "P/E Multiple"),
      FairValueMethod::PsMultiple => write!(f, "P/S Multiple"),
      FairValueMethod::EvEbitda => write!(f, "EV/EBITDA"),
    }
  }
}

/// One method's per-share fair value and the figures behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairValueEstimate {
  pub method: FairValueMethod,
  pub fair_value_per_share: f64,

  /// Free cash flow, EPS, revenue per share or EBITDA, depending on the method
  pub base_metric: f64,

  /// Multiple applied to `base_metric`; absent for the DCF
  pub multiple: Option<f64>,

  pub enterprise_value: Option<f64>,
  pub equity_value: Option<f64>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub projected_cash_flows: Vec<f64>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pv_terminal_value: Option<f64>,
}

impl FairValueEstimate {
  fn multiple(method: FairValueMethod, base_metric: f64, multiple: f64, fair_value_per_share: f64) -> Self {
    Self {
      method,
      fair_value_per_share,
      base_metric,
      multiple: Some(multiple),
      enterprise_value: None,
      equity_value: None,
      projected_cash_flows: Vec::new(),
      pv_terminal_value: None,
    }
  }
}

/// A method that could not produce a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMethod {
  pub method: FairValueMethod,
  pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
  StrongBuy,
  Buy,
  Hold,
  Sell,
  StrongSell,
}

impl Recommendation {
  /// Bucket an upside percentage (e.g. 20.0 for +20%)
  pub fn from_upside(upside_pct: f64) -> Self {
    if upside_pct > 30.0 {
      Recommendation::StrongBuy
    } else if upside_pct > 15.0 {
      Recommendation::Buy
    } else if upside_pct > -10.0 {
      Recommendation::Hold
    } else if upside_pct > -25.0 {
      Recommendation::Sell
    } else {
      Recommendation::StrongSell
    }
  }
}

impl fmt::Display for Recommendation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Recommendation::StrongBuy => write!(f, "Strong Buy - Significantly Undervalued"),
      Recommendation::Buy => write!(f, "Buy - Undervalued"),
      Recommendation::Hold => write!(f, "Hold - Fairly Valued"),
      Recommendation::Sell => write!(f, "Sell - Overvalued"),
      Recommendation::StrongSell => write!(f, "Strong Sell - Significantly Overvalued"),
    }
  }
}

/// Combined result of the cross-check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairValueReport {
  pub ticker: String,
  pub current_price: f64,

  /// Mean of the positive per-share estimates, 0 when there are none
  pub fair_value_average: f64,

  pub upside_pct: f64,
  pub recommendation: Recommendation,
  pub estimates: Vec<FairValueEstimate>,
  pub skipped: Vec<SkippedMethod>,
  pub growth_rate: f64,
  pub terminal_growth: f64,
  pub wacc: f64,
}

/// Mean historical revenue growth clamped to [-20%, 50%]; 5% without two usable periods
pub fn estimate_growth_rate(income: &[IncomeStatement]) -> f64 {
  if income.len() < 2 {
    return DEFAULT_GROWTH_RATE;
  }

  let rates: Vec<f64> = income
    .windows(2)
    .filter_map(|pair| {
      let current = pair[0].revenue.unwrap_or(0.0);
      let prior = pair[1].revenue.unwrap_or(0.0);
      if prior > 0.0 {
        let growth = (current - prior) / prior;
        (growth > -0.5 && growth < 2.0).then_some(growth)
      } else {
        None
      }
    })
    .collect();

  if rates.is_empty() {
    return DEFAULT_GROWTH_RATE;
  }
  let avg = rates.iter().sum::<f64>() / rates.len() as f64;
  avg.clamp(MIN_PROJECTED_GROWTH, MAX_PROJECTED_GROWTH)
}

fn insufficient(method: FairValueMethod, reason: &str) -> Error {
  Error::InsufficientData(format!("{}: {}", method, reason))
}

fn latest_statements(data: &FairValueData, method: FairValueMethod) -> Result<(&IncomeStatement, &BalanceSheet)> {
  match (data.income.first(), data.balance.first()) {
    (Some(income), Some(balance)) => Ok((income, balance)),
    _ => Err(insufficient(method, "Insufficient data")),
  }
}

fn per_share(equity_value: f64, shares: f64) -> f64 {
  if shares > 0.0 {
    equity_value / shares
  } else {
    0.0
  }
}

/// Five years of free cash flow growing at `growth_rate`, plus a Gordon terminal value
pub fn dcf_valuation(data: &FairValueData, growth_rate: f64, terminal_growth: f64, wacc: f64) -> Result<FairValueEstimate> {
  let method = FairValueMethod::Dcf;
  let (Some(cash_flow), Some(balance)) = (data.cash_flows.first(), data.balance.first()) else {
    return Err(insufficient(method, "Insufficient data"));
  };

  let fcf = cash_flow.free_cash_flow();
  if fcf <= 0.0 {
    return Err(insufficient(method, "Negative free cash flow"));
  }

  let projected: Vec<f64> = (1..=DCF_PROJECTION_YEARS).map(|year| fcf * (1.0 + growth_rate).powi(year as i32)).collect();
  let pv_cash_flows: f64 = (1u32..).zip(&projected).map(|(year, cf)| cf * discount_factor(wacc, year)).sum();

  let last = projected[projected.len() - 1];
  let terminal_value = gordon_terminal_value(last * (1.0 + terminal_growth), wacc, terminal_growth)?;
  let pv_terminal_value = terminal_value * discount_factor(wacc, DCF_PROJECTION_YEARS);

  let enterprise_value = pv_cash_flows + pv_terminal_value;
  let equity_value =
    enterprise_value - balance.total_debt.unwrap_or(0.0) + balance.cash_and_equivalents.unwrap_or(0.0);

  Ok(FairValueEstimate {
    method,
    fair_value_per_share: per_share(equity_value, balance.outstanding_shares.unwrap_or(0.0)),
    base_metric: fcf,
    multiple: None,
    enterprise_value: Some(enterprise_value),
    equity_value: Some(equity_value),
    projected_cash_flows: projected,
    pv_terminal_value: Some(pv_terminal_value),
  })
}

/// EPS times the current P/E when it is plausible, else a 20x default
pub fn pe_valuation(data: &FairValueData) -> Result<FairValueEstimate> {
  let method = FairValueMethod::PeMultiple;
  let (income, balance) = latest_statements(data, method)?;

  let net_income = income.net_income.unwrap_or(0.0);
  let shares = balance.outstanding_shares.unwrap_or(0.0);
  if shares <= 0.0 || net_income <= 0.0 {
    return Err(insufficient(method, "Negative or zero earnings"));
  }

  let eps = net_income / shares;
  let multiple = data
    .metrics
    .as_ref()
    .and_then(|m| m.price_to_earnings_ratio)
    .filter(|pe| *pe > 0.0 && *pe < MAX_TRUSTED_PE)
    .unwrap_or(DEFAULT_PE_MULTIPLE);

  Ok(FairValueEstimate::multiple(method, eps, multiple, eps * multiple))
}

/// Revenue per share at a 3x multiple
pub fn ps_valuation(data: &FairValueData) -> Result<FairValueEstimate> {
  let method = FairValueMethod::PsMultiple;
  let (income, balance) = latest_statements(data, method)?;

  let revenue = income.revenue.unwrap_or(0.0);
  let shares = balance.outstanding_shares.unwrap_or(0.0);
  if shares <= 0.0 || revenue <= 0.0 {
    return Err(insufficient(method, "No revenue data"));
  }

  let revenue_per_share = revenue / shares;
  Ok(FairValueEstimate::multiple(method, revenue_per_share, PS_MULTIPLE, revenue_per_share * PS_MULTIPLE))
}

/// Operating income (as an EBITDA proxy) at a 12x multiple, bridged to equity
pub fn ev_ebitda_valuation(data: &FairValueData) -> Result<FairValueEstimate> {
  let method = FairValueMethod::EvEbitda;
  let (income, balance) = latest_statements(data, method)?;

  let ebitda = income.operating_income.unwrap_or(0.0);
  if ebitda <= 0.0 {
    return Err(insufficient(method, "Negative EBITDA"));
  }

  let enterprise_value = ebitda * EV_EBITDA_MULTIPLE;
  let equity_value =
    enterprise_value - balance.total_debt.unwrap_or(0.0) + balance.cash_and_equivalents.unwrap_or(0.0);

  Ok(FairValueEstimate {
    enterprise_value: Some(enterprise_value),
    equity_value: Some(equity_value),
    ..FairValueEstimate::multiple(
      method,
      ebitda,
      EV_EBITDA_MULTIPLE,
      per_share(equity_value, balance.outstanding_shares.unwrap_or(0.0)),
    )
  })
}

/// Run every method over already-fetched data.
///
/// Methods lacking data are listed in `skipped`; only an invalid assumption fails the
/// whole report.
pub fn evaluate(ticker: &str, data: &FairValueData, inputs: &FairValueInputs) -> Result<FairValueReport> {
  let growth_rate = inputs.growth_rate.unwrap_or_else(|| estimate_growth_rate(&data.income));
  let wacc = inputs.wacc.unwrap_or(DEFAULT_WACC);
  let terminal_growth = inputs.terminal_growth;

  for (field, value) in [("growth_rate", growth_rate), ("terminal_growth", terminal_growth), ("wacc", wacc)] {
    if !value.is_finite() {
      return Err(Error::invalid_assumption(field, format!("{} is not a finite number", value)));
    }
  }

  let attempts = [
    (FairValueMethod::Dcf, dcf_valuation(data, growth_rate, terminal_growth, wacc)),
    (FairValueMethod::PeMultiple, pe_valuation(data)),
    (FairValueMethod::PsMultiple, ps_valuation(data)),
    (FairValueMethod::EvEbitda, ev_ebitda_valuation(data)),
  ];

  let mut estimates = Vec::new();
  let mut skipped = Vec::new();
  for (method, attempt) in attempts {
    match attempt {
      Ok(estimate) => estimates.push(estimate),
      Err(e @ Error::InvalidAssumption { .. }) => return Err(e),
      Err(e) => skipped.push(SkippedMethod { method, reason: e.to_string() }),
    }
  }

  let positive: Vec<f64> =
    estimates.iter().map(|e| e.fair_value_per_share).filter(|value| *value > 0.0).collect();
  let fair_value_average =
    if positive.is_empty() { 0.0 } else { positive.iter().sum::<f64>() / positive.len() as f64 };

  let current_price = data.price.unwrap_or(0.0);
  let upside_pct = if current_price > 0.0 && fair_value_average > 0.0 {
    (fair_value_average - current_price) / current_price * 100.0
  } else {
    0.0
  };

  Ok(FairValueReport {
    ticker: ticker.to_uppercase(),
    current_price,
    fair_value_average,
    upside_pct,
    recommendation: Recommendation::from_upside(upside_pct),
    estimates,
    skipped,
    growth_rate,
    terminal_growth,
    wacc,
  })
}

/// Fetches five years of statements plus market snapshots and runs [`evaluate`]
pub struct FairValueCalculator {
  source: Arc<dyn FinancialDataSource>,
}

impl FairValueCalculator {
  pub fn new(source: Arc<dyn FinancialDataSource>) -> Self {
    Self { source }
  }

  #[instrument(skip(self, inputs), fields(source = self.source.name()))]
  pub async fn calculate(&self, ticker: &str, inputs: &FairValueInputs) -> Result<FairValueReport> {
    let (income, balance, cash_flows, metrics, price) = futures::join!(
      self.source.income_statements(ticker, FAIR_VALUE_HISTORY),
      self.source.balance_sheets(ticker, FAIR_VALUE_HISTORY),
      self.source.cash_flow_statements(ticker, FAIR_VALUE_HISTORY),
      self.source.metrics_snapshot(ticker),
      self.source.price_snapshot(ticker),
    );

    let data = FairValueData {
      income: or_empty(ticker, "income statements", income),
      balance: or_empty(ticker, "balance sheets", balance),
      cash_flows: or_empty(ticker, "cash flow statements", cash_flows),
      metrics: or_empty(ticker, "financial metrics", metrics),
      price: or_empty(ticker, "price snapshot", price).and_then(|snapshot| snapshot.price),
    };

    let report = evaluate(ticker, &data, inputs)?;
    info!(
      "{} fair value {:.2} vs price {:.2} ({:+.1}%): {}",
      report.ticker, report.fair_value_average, report.current_price, report.upside_pct, report.recommendation
    );
    Ok(report)
  }
}

/// Treat a failed fetch as absent data, with a warning
pub(crate) fn or_empty<T: Default>(ticker: &str, what: &str, result: Result<T>) -> T {
  result.unwrap_or_else(|e| {
    warn!("{} unavailable for {}: {}", what, ticker, e);
    T::default()
  })
}
