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

//! Assumption estimation: effective tax rate, WACC and terminal growth.
//!
//! Every estimate degrades to a fixed default instead of failing. Estimates carry the
//! evidence they were computed from so callers can show how a number was reached.

use ipv_client::FinancialDataSource;
use ipv_models::{
  AssumptionOverrides, AssumptionSet, BalanceSheet, EstimateSource, FinancialStatement, GrowthEstimate,
  TaxRateEstimate, WaccComponents, WaccEstimate,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// US federal corporate rate
pub const DEFAULT_TAX_RATE: f64 = 0.21;
pub const DEFAULT_WACC: f64 = 0.10;
/// Long-run nominal GDP growth
pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.025;

/// 10-year Treasury approximation
pub const RISK_FREE_RATE: f64 = 0.045;
pub const MARKET_RISK_PREMIUM: f64 = 0.06;

pub const DEFAULT_COST_OF_DEBT: f64 = 0.04;
pub const MAX_COST_OF_DEBT: f64 = 0.15;

/// Highest per-period effective tax rate accepted as plausible
pub const MAX_PLAUSIBLE_TAX_RATE: f64 = 0.50;

pub const MIN_TERMINAL_GROWTH: f64 = 0.01;
pub const MAX_TERMINAL_GROWTH: f64 = 0.04;

/// Periods read by each estimate
const TAX_PERIODS: usize = 3;
const MIN_GROWTH_PERIODS: usize = 3;

/// Statement history requested from the data source
pub const INCOME_STATEMENT_LIMIT: usize = 5;
pub const BALANCE_SHEET_LIMIT: usize = 2;

/// Round to 4 decimal places
pub fn round4(value: f64) -> f64 {
  (value * 10_000.0).round() / 10_000.0
}

fn mean(values: &[f64]) -> f64 {
  values.iter().sum::<f64>() / values.len() as f64
}

/// Average effective tax rate over the most recent three periods.
///
/// A period counts when pretax income is positive, tax expense is non-negative and the
/// implied rate is at most 50%.
pub fn estimate_tax_rate(statements: &[FinancialStatement]) -> TaxRateEstimate {
  if statements.is_empty() {
    return TaxRateEstimate {
      effective_tax_rate: DEFAULT_TAX_RATE,
      source: EstimateSource::Default,
      note: "Using default US corporate tax rate (21%)".to_string(),
      yearly_rates: Vec::new(),
    };
  }

  let yearly_rates: Vec<f64> = statements
    .iter()
    .take(TAX_PERIODS)
    .filter_map(|statement| {
      let tax_expense = statement.income_tax_expense.unwrap_or(0.0);
      let pretax = statement.pretax_income();
      if pretax > 0.0 && tax_expense >= 0.0 {
        let rate = tax_expense / pretax;
        (0.0..=MAX_PLAUSIBLE_TAX_RATE).contains(&rate).then_some(rate)
      } else {
        None
      }
    })
    .collect();

  if yearly_rates.is_empty() {
    return TaxRateEstimate {
      effective_tax_rate: DEFAULT_TAX_RATE,
      source: EstimateSource::Default,
      note: "Insufficient data, using default US corporate tax rate (21%)".to_string(),
      yearly_rates,
    };
  }

  TaxRateEstimate {
    effective_tax_rate: round4(mean(&yearly_rates)),
    source: EstimateSource::Calculated,
    note: format!("Average effective tax rate from last {} years", yearly_rates.len()),
    yearly_rates,
  }
}

/// Size-bracket beta: mega caps track the market, smaller companies carry more risk
pub fn beta_for_market_cap(market_cap: f64) -> f64 {
  if market_cap >= 500e9 {
    1.0
  } else if market_cap >= 100e9 {
    1.1
  } else if market_cap >= 10e9 {
    1.2
  } else {
    1.3
  }
}

/// CAPM with a fixed risk-free rate and market risk premium
pub fn cost_of_equity(beta: f64) -> f64 {
  RISK_FREE_RATE + beta * MARKET_RISK_PREMIUM
}

/// Interest expense over total debt, capped at 15%; 4% when either is missing
pub fn cost_of_debt(interest_expense: Option<f64>, total_debt: f64) -> f64 {
  match interest_expense {
    Some(interest) if interest > 0.0 && total_debt > 0.0 => (interest / total_debt).min(MAX_COST_OF_DEBT),
    _ => DEFAULT_COST_OF_DEBT,
  }
}

fn default_wacc() -> WaccEstimate {
  WaccEstimate {
    wacc: DEFAULT_WACC,
    source: EstimateSource::Default,
    note: "Using default WACC (10%) - insufficient data for calculation".to_string(),
    components: None,
  }
}

/// `E/V * Re + D/V * Rd * (1 - T)` from the latest balance sheet and price.
///
/// Equity is shares outstanding times price, or book equity when either is missing.
/// The balance sheet is used whatever its period; interest expense comes from the most
/// recent income statement.
pub fn estimate_wacc(
  balance: Option<&BalanceSheet>,
  interest_expense: Option<f64>,
  price: Option<f64>,
  tax_rate: f64,
) -> WaccEstimate {
  let Some(balance) = balance else {
    debug!("No balance sheet data, using default WACC");
    return default_wacc();
  };

  let total_debt = balance.total_debt.unwrap_or(0.0);
  let shares = balance.outstanding_shares.unwrap_or(0.0);
  let price = price.unwrap_or(0.0);

  let market_cap = if shares > 0.0 && price > 0.0 {
    shares * price
  } else {
    balance.shareholders_equity.unwrap_or(0.0)
  };

  let cost_of_debt = cost_of_debt(interest_expense, total_debt);
  let beta = beta_for_market_cap(market_cap);
  let cost_of_equity = cost_of_equity(beta);

  let total_value = market_cap + total_debt;
  if total_value <= 0.0 {
    return default_wacc();
  }

  let equity_weight = market_cap / total_value;
  let debt_weight = total_debt / total_value;
  let wacc = equity_weight * cost_of_equity + debt_weight * cost_of_debt * (1.0 - tax_rate);

  WaccEstimate {
    wacc: round4(wacc),
    source: EstimateSource::Calculated,
    note: "Calculated using CAPM and market data".to_string(),
    components: Some(WaccComponents {
      market_cap,
      total_debt,
      cost_of_equity: round4(cost_of_equity),
      cost_of_debt: round4(cost_of_debt),
      beta,
      equity_weight: round4(equity_weight),
      debt_weight: round4(debt_weight),
      tax_rate,
    }),
  }
}

fn default_growth() -> GrowthEstimate {
  GrowthEstimate {
    terminal_growth: DEFAULT_TERMINAL_GROWTH,
    source: EstimateSource::Default,
    note: "Using default GDP growth rate (2.5%)".to_string(),
    historical_avg_growth: None,
    yearly_growth_rates: Vec::new(),
  }
}

/// Mean historical revenue growth, clamped to [1%, 4%].
///
/// Needs at least three periods. Year-over-year rates outside (-50%, 50%) are discarded
/// as anomalies.
pub fn estimate_terminal_growth(statements: &[FinancialStatement]) -> GrowthEstimate {
  if statements.len() < MIN_GROWTH_PERIODS {
    return default_growth();
  }

  let growth_rates: Vec<f64> = statements
    .windows(2)
    .filter_map(|pair| {
      let current = pair[0].revenue.unwrap_or(0.0);
      let prior = pair[1].revenue.unwrap_or(0.0);
      if prior > 0.0 {
        let growth = (current - prior) / prior;
        (growth > -0.5 && growth < 0.5).then_some(growth)
      } else {
        None
      }
    })
    .collect();

  if growth_rates.is_empty() {
    return default_growth();
  }

  let avg_growth = mean(&growth_rates);
  GrowthEstimate {
    terminal_growth: round4(avg_growth.clamp(MIN_TERMINAL_GROWTH, MAX_TERMINAL_GROWTH)),
    source: EstimateSource::Calculated,
    note: format!("Based on {}-year avg growth, capped at GDP+inflation", growth_rates.len()),
    historical_avg_growth: Some(round4(avg_growth)),
    yearly_growth_rates: growth_rates.into_iter().map(round4).collect(),
  }
}

fn override_note(name: &str) -> String {
  format!("{} supplied by caller", name)
}

/// All three estimates, with caller overrides taking precedence.
///
/// `statements` carry the income history, most recent first. An overridden tax rate also
/// feeds the WACC after-tax cost of debt.
pub fn estimate_assumptions(
  statements: &[FinancialStatement],
  latest_balance: Option<&BalanceSheet>,
  price: Option<f64>,
  overrides: &AssumptionOverrides,
) -> AssumptionSet {
  let tax_rate = match overrides.tax_rate {
    Some(rate) => TaxRateEstimate {
      effective_tax_rate: rate,
      source: EstimateSource::Override,
      note: override_note("Tax rate"),
      yearly_rates: Vec::new(),
    },
    None => estimate_tax_rate(statements),
  };

  let wacc = match overrides.wacc {
    Some(wacc) => WaccEstimate {
      wacc,
      source: EstimateSource::Override,
      note: override_note("WACC"),
      components: None,
    },
    None => estimate_wacc(
      latest_balance,
      statements.first().and_then(|s| s.interest_expense),
      price,
      tax_rate.effective_tax_rate,
    ),
  };

  let terminal_growth = match overrides.terminal_growth {
    Some(growth) => GrowthEstimate {
      terminal_growth: growth,
      source: EstimateSource::Override,
      note: override_note("Terminal growth"),
      historical_avg_growth: None,
      yearly_growth_rates: Vec::new(),
    },
    None => estimate_terminal_growth(statements),
  };

  AssumptionSet { wacc, tax_rate, terminal_growth }
}

/// Fetches statements and a price quote, then runs the estimates
pub struct AssumptionEstimator {
  source: Arc<dyn FinancialDataSource>,
}

impl AssumptionEstimator {
  pub fn new(source: Arc<dyn FinancialDataSource>) -> Self {
    Self { source }
  }

  /// Estimate every assumption the overrides leave open. Never fails: fetch errors are
  /// logged and the affected estimates fall back to their defaults.
  #[instrument(skip(self, overrides), fields(source = self.source.name()))]
  pub async fn estimate(&self, ticker: &str, overrides: &AssumptionOverrides) -> AssumptionSet {
    if overrides.is_complete() {
      return estimate_assumptions(&[], None, None, overrides);
    }

    let (income, balance, price) = futures::join!(
      self.source.income_statements(ticker, INCOME_STATEMENT_LIMIT),
      self.source.balance_sheets(ticker, BALANCE_SHEET_LIMIT),
      self.source.price_snapshot(ticker),
    );

    let income = income.unwrap_or_else(|e| {
      warn!("Income statements unavailable for {}: {}", ticker, e);
      Vec::new()
    });
    let balance = balance.unwrap_or_else(|e| {
      warn!("Balance sheets unavailable for {}: {}", ticker, e);
      Vec::new()
    });
    let price = price
      .unwrap_or_else(|e| {
        warn!("Price snapshot unavailable for {}: {}", ticker, e);
        None
      })
      .and_then(|snapshot| snapshot.price);

    let statements: Vec<FinancialStatement> = income.iter().map(FinancialStatement::from_income).collect();
    let assumptions = estimate_assumptions(&statements, balance.first(), price, overrides);

    info!(
      "Assumptions for {}: WACC {:.2}% ({:?}), tax {:.2}% ({:?}), terminal growth {:.2}% ({:?})",
      ticker,
      assumptions.wacc.wacc * 100.0,
      assumptions.wacc.source,
      assumptions.tax_rate.effective_tax_rate * 100.0,
      assumptions.tax_rate.source,
      assumptions.terminal_growth.terminal_growth * 100.0,
      assumptions.terminal_growth.source,
    );
    assumptions
  }
}
