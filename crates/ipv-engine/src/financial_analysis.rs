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

//! Company-level financial analysis that gives context to IP values.
//!
//! Six independent views are computed from the latest statements: financial health,
//! profitability, R&D investment, capital structure, market position and risk. A view
//! whose inputs are missing is left out of the report rather than filled with zeros.

use crate::assumptions::round4;
use crate::fair_value::or_empty;
use ipv_client::FinancialDataSource;
use ipv_models::{BalanceSheet, CashFlowStatement, IncomeStatement, PriceSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// Statement history requested per endpoint
pub const ANALYSIS_INCOME_HISTORY: usize = 5;
pub const ANALYSIS_BALANCE_HISTORY: usize = 3;
pub const ANALYSIS_CASH_FLOW_HISTORY: usize = 3;

/// Reported in place of ratios that are unbounded or meaningless (no interest, tiny EPS)
pub const RATIO_CAP: f64 = 999.0;

/// Multiples at or above this are reported as [`RATIO_CAP`]
const MULTIPLE_DISPLAY_LIMIT: f64 = 1000.0;

/// Periods used for margin trends and revenue volatility
const TREND_PERIODS: usize = 3;

const RD_HISTORY: usize = 5;

fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

/// `numerator / denominator` when the denominator is positive, else 0
fn ratio(numerator: f64, denominator: f64) -> f64 {
  if denominator > 0.0 {
    numerator / denominator
  } else {
    0.0
  }
}

/// Inputs for [`analyze`], most recent period first
#[derive(Debug, Clone, Default)]
pub struct AnalysisData {
  pub income: Vec<IncomeStatement>,
  pub balance: Vec<BalanceSheet>,
  pub cash_flows: Vec<CashFlowStatement>,
  pub price: Option<PriceSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthRating {
  Excellent,
  Good,
  Moderate,
  Weak,
}

impl HealthRating {
  /// Each of liquidity, leverage and coverage scores 1 to 3 points
  pub fn from_ratios(current_ratio: f64, debt_to_equity: f64, interest_coverage: f64) -> Self {
    let liquidity = if current_ratio > 1.5 {
      3
    } else if current_ratio > 1.0 {
      2
    } else {
      1
    };
    let leverage = if debt_to_equity < 0.5 {
      3
    } else if debt_to_equity < 1.0 {
      2
    } else {
      1
    };
    let coverage = if interest_coverage > 10.0 {
      3
    } else if interest_coverage > 5.0 {
      2
    } else {
      1
    };

    match liquidity + leverage + coverage {
      8.. => HealthRating::Excellent,
      6..=7 => HealthRating::Good,
      4..=5 => HealthRating::Moderate,
      _ => HealthRating::Weak,
    }
  }
}

impl fmt::Display for HealthRating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HealthRating::Excellent => write!(f, "Excellent - Strong financial position supports IP development"),
      HealthRating::Good => write!(f, "Good - Healthy balance sheet for IP investment"),
      HealthRating::Moderate => write!(f, "Moderate - Some financial constraints on IP spending"),
      HealthRating::Weak => write!(f, "Weak - Financial stress may limit IP development"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealth {
  pub current_ratio: f64,
  /// Cash and receivables over current liabilities
  pub quick_ratio: f64,
  pub debt_to_equity: f64,
  /// Operating income over interest expense; [`RATIO_CAP`] without interest expense
  pub interest_coverage: f64,
  pub free_cash_flow: f64,
  pub fcf_margin: f64,
  pub rating: HealthRating,
}

/// Liquidity, leverage and coverage from the latest balance sheet and income statement
pub fn financial_health(data: &AnalysisData) -> Option<FinancialHealth> {
  let balance = data.balance.first()?;
  let income = data.income.first()?;

  let current_liabilities = balance.current_liabilities.unwrap_or(0.0);
  let current_ratio = ratio(balance.current_assets.unwrap_or(0.0), current_liabilities);
  let quick_assets =
    balance.cash_and_equivalents.unwrap_or(0.0) + balance.trade_and_non_trade_receivables.unwrap_or(0.0);
  let quick_ratio = ratio(quick_assets, current_liabilities);
  let debt_to_equity = ratio(balance.total_debt.unwrap_or(0.0), balance.shareholders_equity.unwrap_or(0.0));

  let interest_expense = income.interest_expense.unwrap_or(0.0);
  let interest_coverage = if interest_expense > 0.0 {
    (income.operating_income.unwrap_or(0.0) / interest_expense).min(RATIO_CAP)
  } else {
    RATIO_CAP
  };

  let free_cash_flow = data.cash_flows.first().map(CashFlowStatement::free_cash_flow).unwrap_or(0.0);
  let fcf_margin = ratio(free_cash_flow, income.revenue.unwrap_or(0.0));

  Some(FinancialHealth {
    current_ratio: round2(current_ratio),
    quick_ratio: round2(quick_ratio),
    debt_to_equity: round2(debt_to_equity),
    interest_coverage: round2(interest_coverage),
    free_cash_flow,
    fcf_margin: round4(fcf_margin),
    rating: HealthRating::from_ratios(current_ratio, debt_to_equity, interest_coverage),
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
  Improving,
  Declining,
}

impl Trend {
  /// Latest value against the one before it
  fn of(values: &[f64]) -> Option<Self> {
    match values {
      [latest, prior, ..] if latest > prior => Some(Trend::Improving),
      [_, _, ..] => Some(Trend::Declining),
      _ => None,
    }
  }
}

/// What the gross margin says about IP pricing power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingPower {
  Strong,
  Healthy,
  Limited,
}

impl PricingPower {
  pub fn from_gross_margin(gross_margin: f64) -> Self {
    if gross_margin > 0.6 {
      PricingPower::Strong
    } else if gross_margin > 0.4 {
      PricingPower::Healthy
    } else {
      PricingPower::Limited
    }
  }
}

impl fmt::Display for PricingPower {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PricingPower::Strong => write!(f, "High gross margins suggest strong IP/brand pricing power"),
      PricingPower::Healthy => write!(f, "Healthy margins indicate IP contributing to competitive advantage"),
      PricingPower::Limited => write!(f, "Lower margins may indicate IP is less differentiated"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
  pub gross_margin: f64,
  pub operating_margin: f64,
  pub net_margin: f64,
  pub roe: f64,
  pub roa: f64,

  /// Present when three or more periods are available
  pub gross_margin_trend: Option<Trend>,
  pub operating_margin_trend: Option<Trend>,

  pub pricing_power: PricingPower,
}

/// Margins and returns for the latest period, with trends over the last three
pub fn profitability(data: &AnalysisData) -> Option<Profitability> {
  let income = data.income.first()?;
  let balance = data.balance.first()?;

  let revenue = income.revenue.unwrap_or(0.0);
  let net_income = income.net_income.unwrap_or(0.0);
  let gross_margin = ratio(income.gross_profit.unwrap_or(0.0), revenue);

  let (gross_margin_trend, operating_margin_trend) = if data.income.len() >= TREND_PERIODS {
    let (gross, operating): (Vec<f64>, Vec<f64>) = data.income[..TREND_PERIODS]
      .iter()
      .filter_map(|s| {
        let revenue = s.revenue.unwrap_or(0.0);
        (revenue > 0.0).then(|| {
          (s.gross_profit.unwrap_or(0.0) / revenue, s.operating_income.unwrap_or(0.0) / revenue)
        })
      })
      .unzip();
    (Trend::of(&gross), Trend::of(&operating))
  } else {
    (None, None)
  };

  Some(Profitability {
    gross_margin: round4(gross_margin),
    operating_margin: round4(ratio(income.operating_income.unwrap_or(0.0), revenue)),
    net_margin: round4(ratio(net_income, revenue)),
    roe: round4(ratio(net_income, balance.shareholders_equity.unwrap_or(0.0))),
    roa: round4(ratio(net_income, balance.total_assets.unwrap_or(0.0))),
    gross_margin_trend,
    operating_margin_trend,
    pricing_power: PricingPower::from_gross_margin(gross_margin),
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpGenerationPotential {
  Excellent,
  Good,
  Moderate,
  Low,
}

impl IpGenerationPotential {
  /// Above 15% of revenue is heavy R&D, excellent when also growing over 10% a year.
  /// Above 8% is average.
  pub fn assess(rd_intensity: f64, rd_growth_rate: f64) -> Self {
    if rd_intensity > 0.15 {
      if rd_growth_rate > 0.10 {
        IpGenerationPotential::Excellent
      } else {
        IpGenerationPotential::Good
      }
    } else if rd_intensity > 0.08 {
      IpGenerationPotential::Moderate
    } else {
      IpGenerationPotential::Low
    }
  }
}

impl fmt::Display for IpGenerationPotential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IpGenerationPotential::Excellent => {
        write!(f, "Excellent - Heavy R&D investment with growth suggests strong IP pipeline")
      }
      IpGenerationPotential::Good => write!(f, "Good - Significant R&D spend indicates active IP development"),
      IpGenerationPotential::Moderate => write!(f, "Moderate - Average R&D investment for IP generation"),
      IpGenerationPotential::Low => write!(f, "Low - Limited R&D suggests less IP-intensive business model"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdAnalysis {
  /// Mean R&D share of revenue over periods with both figures positive
  pub rd_intensity: f64,
  pub latest_rd_spend: f64,
  /// Latest year over the year before; 0 without a positive prior year
  pub rd_growth_rate: f64,
  pub rd_history: Vec<f64>,
  pub ip_generation_potential: IpGenerationPotential,
}

pub fn rd_analysis(data: &AnalysisData) -> Option<RdAnalysis> {
  if data.income.is_empty() {
    return None;
  }

  let rd_amounts: Vec<f64> = data.income.iter().map(|s| s.research_and_development.unwrap_or(0.0)).collect();
  let intensities: Vec<f64> = data
    .income
    .iter()
    .zip(&rd_amounts)
    .filter_map(|(s, &rd)| {
      let revenue = s.revenue.unwrap_or(0.0);
      (revenue > 0.0 && rd > 0.0).then(|| rd / revenue)
    })
    .collect();

  let rd_intensity =
    if intensities.is_empty() { 0.0 } else { intensities.iter().sum::<f64>() / intensities.len() as f64 };
  let rd_growth_rate = match rd_amounts.as_slice() {
    [latest, prior, ..] if *prior > 0.0 => (latest - prior) / prior,
    _ => 0.0,
  };

  Some(RdAnalysis {
    rd_intensity: round4(rd_intensity),
    latest_rd_spend: rd_amounts[0],
    rd_growth_rate: round4(rd_growth_rate),
    rd_history: rd_amounts.into_iter().take(RD_HISTORY).collect(),
    ip_generation_potential: IpGenerationPotential::assess(rd_intensity, rd_growth_rate),
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leverage {
  Conservative,
  Moderate,
  Elevated,
  High,
}

impl Leverage {
  pub fn from_debt_to_equity(debt_to_equity: f64) -> Self {
    if debt_to_equity < 0.3 {
      Leverage::Conservative
    } else if debt_to_equity < 0.7 {
      Leverage::Moderate
    } else if debt_to_equity < 1.5 {
      Leverage::Elevated
    } else {
      Leverage::High
    }
  }
}

impl fmt::Display for Leverage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Leverage::Conservative => write!(f, "Conservative - Low debt supports IP investment flexibility"),
      Leverage::Moderate => write!(f, "Moderate - Balanced capital structure"),
      Leverage::Elevated => write!(f, "Elevated - Higher debt may constrain IP spending"),
      Leverage::High => write!(f, "High - Significant leverage limits financial flexibility"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalStructure {
  pub total_debt: f64,
  pub shareholders_equity: f64,
  /// From the price snapshot, 0 when unavailable
  pub market_cap: f64,
  pub debt_to_assets: f64,
  pub debt_to_equity: f64,
  pub equity_to_assets: f64,
  pub market_to_book: f64,
  pub leverage: Leverage,
}

pub fn capital_structure(data: &AnalysisData) -> Option<CapitalStructure> {
  let balance = data.balance.first()?;

  let total_debt = balance.total_debt.unwrap_or(0.0);
  let shareholders_equity = balance.shareholders_equity.unwrap_or(0.0);
  let total_assets = balance.total_assets.unwrap_or(0.0);
  let market_cap = data.price.as_ref().and_then(|p| p.market_cap).unwrap_or(0.0);
  let debt_to_equity = ratio(total_debt, shareholders_equity);

  Some(CapitalStructure {
    total_debt,
    shareholders_equity,
    market_cap,
    debt_to_assets: round4(ratio(total_debt, total_assets)),
    debt_to_equity: round4(debt_to_equity),
    equity_to_assets: round4(ratio(shareholders_equity, total_assets)),
    market_to_book: round2(ratio(market_cap, shareholders_equity)),
    leverage: Leverage::from_debt_to_equity(debt_to_equity),
  })
}

/// How richly the market prices revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationTier {
  Premium,
  AboveAverage,
  Standard,
}

impl ValuationTier {
  pub fn from_ev_revenue(ev_revenue: f64) -> Self {
    if ev_revenue > 10.0 {
      ValuationTier::Premium
    } else if ev_revenue > 5.0 {
      ValuationTier::AboveAverage
    } else {
      ValuationTier::Standard
    }
  }
}

impl fmt::Display for ValuationTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValuationTier::Premium => write!(f, "Premium valuation suggests market values IP/intangibles highly"),
      ValuationTier::AboveAverage => {
        write!(f, "Above-average valuation indicates IP contributes to market value")
      }
      ValuationTier::Standard => write!(f, "Standard valuation multiples"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPosition {
  pub market_cap: f64,
  /// Market cap plus debt minus cash
  pub enterprise_value: f64,
  pub price: f64,
  pub pe_ratio: f64,
  pub ev_revenue: f64,
  /// Operating income stands in for EBITDA
  pub ev_ebitda: f64,
  pub valuation_tier: ValuationTier,
}

fn capped_multiple(value: f64) -> f64 {
  if value < MULTIPLE_DISPLAY_LIMIT {
    round2(value)
  } else {
    RATIO_CAP
  }
}

/// Market multiples; needs a price snapshot as well as both statements
pub fn market_position(data: &AnalysisData) -> Option<MarketPosition> {
  let snapshot = data.price.as_ref()?;
  let income = data.income.first()?;
  let balance = data.balance.first()?;

  let market_cap = snapshot.market_cap.unwrap_or(0.0);
  let price = snapshot.price.unwrap_or(0.0);
  let revenue = income.revenue.unwrap_or(0.0);
  let enterprise_value =
    market_cap + balance.total_debt.unwrap_or(0.0) - balance.cash_and_equivalents.unwrap_or(0.0);

  let eps = ratio(income.net_income.unwrap_or(0.0), balance.outstanding_shares.unwrap_or(0.0));
  let pe_ratio = ratio(price, eps);
  let ev_revenue = ratio(enterprise_value, revenue);
  let ev_ebitda = ratio(enterprise_value, income.operating_income.unwrap_or(0.0));

  Some(MarketPosition {
    market_cap,
    enterprise_value,
    price,
    pe_ratio: capped_multiple(pe_ratio),
    ev_revenue: round2(ev_revenue),
    ev_ebitda: capped_multiple(ev_ebitda),
    valuation_tier: ValuationTier::from_ev_revenue(ev_revenue),
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
  Low,
  Moderate,
  Higher,
}

impl RiskLevel {
  pub fn assess(cash_to_liabilities: f64, solvency_ratio: f64) -> Self {
    if cash_to_liabilities > 0.5 && solvency_ratio > 0.3 {
      RiskLevel::Low
    } else if cash_to_liabilities > 0.3 && solvency_ratio > 0.2 {
      RiskLevel::Moderate
    } else {
      RiskLevel::Higher
    }
  }
}

impl fmt::Display for RiskLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RiskLevel::Low => write!(f, "Low Risk - Strong financial position supports IP value stability"),
      RiskLevel::Moderate => write!(f, "Moderate Risk - Adequate financial cushion"),
      RiskLevel::Higher => write!(f, "Higher Risk - Financial constraints may affect IP development/value"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicators {
  pub cash_to_liabilities: f64,
  /// Net assets over total assets
  pub solvency_ratio: f64,
  /// Mean absolute year-over-year revenue change over the last three periods
  pub revenue_volatility: f64,
  pub risk_level: RiskLevel,
}

/// Mean absolute period-over-period change; periods after a non-positive value are skipped
pub fn revenue_volatility(revenues: &[f64]) -> f64 {
  let changes: Vec<f64> = revenues
    .windows(2)
    .filter(|pair| pair[1] > 0.0)
    .map(|pair| ((pair[0] - pair[1]) / pair[1]).abs())
    .collect();
  if changes.is_empty() {
    0.0
  } else {
    changes.iter().sum::<f64>() / changes.len() as f64
  }
}

pub fn risk_indicators(data: &AnalysisData) -> Option<RiskIndicators> {
  let balance = data.balance.first()?;
  if data.income.is_empty() {
    return None;
  }

  let cash_to_liabilities =
    ratio(balance.cash_and_equivalents.unwrap_or(0.0), balance.current_liabilities.unwrap_or(0.0));
  let total_assets = balance.total_assets.unwrap_or(0.0);
  let solvency_ratio = ratio(total_assets - balance.total_liabilities.unwrap_or(0.0), total_assets);

  let volatility = if data.income.len() >= TREND_PERIODS {
    let revenues: Vec<f64> = data.income[..TREND_PERIODS].iter().map(|s| s.revenue.unwrap_or(0.0)).collect();
    revenue_volatility(&revenues)
  } else {
    0.0
  };

  Some(RiskIndicators {
    cash_to_liabilities: round2(cash_to_liabilities),
    solvency_ratio: round4(solvency_ratio),
    revenue_volatility: round4(volatility),
    risk_level: RiskLevel::assess(cash_to_liabilities, solvency_ratio),
  })
}

/// Every view the available data supports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysisReport {
  pub ticker: String,
  pub financial_health: Option<FinancialHealth>,
  pub profitability: Option<Profitability>,
  pub rd_analysis: Option<RdAnalysis>,
  pub capital_structure: Option<CapitalStructure>,
  pub market_position: Option<MarketPosition>,
  pub risk_indicators: Option<RiskIndicators>,
}

impl FinancialAnalysisReport {
  /// Number of views that could be computed
  pub fn section_count(&self) -> usize {
    [
      self.financial_health.is_some(),
      self.profitability.is_some(),
      self.rd_analysis.is_some(),
      self.capital_structure.is_some(),
      self.market_position.is_some(),
      self.risk_indicators.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count()
  }
}

pub fn analyze(ticker: &str, data: &AnalysisData) -> FinancialAnalysisReport {
  FinancialAnalysisReport {
    ticker: ticker.to_uppercase(),
    financial_health: financial_health(data),
    profitability: profitability(data),
    rd_analysis: rd_analysis(data),
    capital_structure: capital_structure(data),
    market_position: market_position(data),
    risk_indicators: risk_indicators(data),
  }
}

/// Fetches statements and a price snapshot, then runs [`analyze`]
pub struct FinancialAnalyzer {
  source: Arc<dyn FinancialDataSource>,
}

impl FinancialAnalyzer {
  pub fn new(source: Arc<dyn FinancialDataSource>) -> Self {
    Self { source }
  }

  /// Never fails: endpoints that error are logged and treated as empty
  #[instrument(skip(self), fields(source = self.source.name()))]
  pub async fn analyze(&self, ticker: &str) -> FinancialAnalysisReport {
    let (income, balance, cash_flows, price) = futures::join!(
      self.source.income_statements(ticker, ANALYSIS_INCOME_HISTORY),
      self.source.balance_sheets(ticker, ANALYSIS_BALANCE_HISTORY),
      self.source.cash_flow_statements(ticker, ANALYSIS_CASH_FLOW_HISTORY),
      self.source.price_snapshot(ticker),
    );

    let data = AnalysisData {
      income: or_empty(ticker, "income statements", income),
      balance: or_empty(ticker, "balance sheets", balance),
      cash_flows: or_empty(ticker, "cash flow statements", cash_flows),
      price: or_empty(ticker, "price snapshot", price),
    };

    let report = analyze(ticker, &data);
    info!("Financial analysis for {}: {} of 6 views available", report.ticker, report.section_count());
    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ipv_client::{FixtureCompany, FixtureDataSource};
  use ipv_core::test_utils::assert_approx_eq;

  fn income(revenue: f64, rd: f64) -> IncomeStatement {
    IncomeStatement {
      revenue: Some(revenue),
      research_and_development: Some(rd),
      gross_profit: Some(revenue * 0.45),
      operating_income: Some(revenue * 0.30),
      net_income: Some(revenue * 0.25),
      interest_expense: Some(revenue * 0.01),
      ..Default::default()
    }
  }

  fn balance() -> BalanceSheet {
    BalanceSheet {
      total_assets: Some(2000.0),
      total_liabilities: Some(1200.0),
      current_assets: Some(600.0),
      current_liabilities: Some(400.0),
      cash_and_equivalents: Some(250.0),
      trade_and_non_trade_receivables: Some(150.0),
      total_debt: Some(400.0),
      shareholders_equity: Some(800.0),
      outstanding_shares: Some(100.0),
      ..Default::default()
    }
  }

  fn data() -> AnalysisData {
    AnalysisData {
      income: vec![income(1000.0, 180.0), income(900.0, 150.0), income(800.0, 120.0)],
      balance: vec![balance()],
      cash_flows: vec![CashFlowStatement {
        operating_cash_flow: Some(300.0),
        capital_expenditures: Some(-50.0),
        ..Default::default()
      }],
      price: Some(PriceSnapshot { price: Some(40.0), market_cap: Some(4000.0), ..Default::default() }),
    }
  }

  #[test]
  fn test_rd_intensity_and_growth() {
    let rd = rd_analysis(&data()).unwrap();

    // (0.18 + 0.1667 + 0.15) / 3
    assert_approx_eq(rd.rd_intensity, round4((0.18 + 150.0 / 900.0 + 0.15) / 3.0), 1e-12);
    assert_approx_eq(rd.rd_growth_rate, 0.2, 1e-12);
    assert_eq!(rd.latest_rd_spend, 180.0);
    assert_eq!(rd.rd_history, vec![180.0, 150.0, 120.0]);
    assert_eq!(rd.ip_generation_potential, IpGenerationPotential::Excellent);
  }

  #[test]
  fn test_ip_generation_thresholds() {
    assert_eq!(IpGenerationPotential::assess(0.20, 0.12), IpGenerationPotential::Excellent);
    assert_eq!(IpGenerationPotential::assess(0.20, 0.10), IpGenerationPotential::Good);
    assert_eq!(IpGenerationPotential::assess(0.15, 0.50), IpGenerationPotential::Moderate);
    assert_eq!(IpGenerationPotential::assess(0.09, 0.0), IpGenerationPotential::Moderate);
    assert_eq!(IpGenerationPotential::assess(0.08, 0.0), IpGenerationPotential::Low);
  }

  #[test]
  fn test_rd_without_prior_spend_has_no_growth() {
    let data = AnalysisData { income: vec![income(1000.0, 50.0), income(900.0, 0.0)], ..Default::default() };
    let rd = rd_analysis(&data).unwrap();
    assert_eq!(rd.rd_growth_rate, 0.0);
    // The zero-R&D year is left out of the intensity average
    assert_approx_eq(rd.rd_intensity, 0.05, 1e-12);
    assert_eq!(rd.ip_generation_potential, IpGenerationPotential::Low);

    assert!(rd_analysis(&AnalysisData::default()).is_none());
  }

  #[test]
  fn test_capital_structure_ratios() {
    let capital = capital_structure(&data()).unwrap();

    assert_eq!(capital.market_cap, 4000.0);
    assert_approx_eq(capital.debt_to_assets, 0.2, 1e-12);
    assert_approx_eq(capital.debt_to_equity, 0.5, 1e-12);
    assert_approx_eq(capital.equity_to_assets, 0.4, 1e-12);
    assert_approx_eq(capital.market_to_book, 5.0, 1e-12);
    assert_eq!(capital.leverage, Leverage::Moderate);
  }

  #[test]
  fn test_capital_structure_without_price_or_equity() {
    let data = AnalysisData {
      balance: vec![BalanceSheet { total_debt: Some(100.0), shareholders_equity: Some(-50.0), ..Default::default() }],
      ..Default::default()
    };
    let capital = capital_structure(&data).unwrap();
    assert_eq!(capital.market_cap, 0.0);
    assert_eq!(capital.debt_to_equity, 0.0);
    assert_eq!(capital.debt_to_assets, 0.0);
    assert_eq!(capital.leverage, Leverage::Conservative);

    assert!(capital_structure(&AnalysisData::default()).is_none());
  }

  #[test]
  fn test_leverage_brackets() {
    assert_eq!(Leverage::from_debt_to_equity(0.29), Leverage::Conservative);
    assert_eq!(Leverage::from_debt_to_equity(0.3), Leverage::Moderate);
    assert_eq!(Leverage::from_debt_to_equity(1.0), Leverage::Elevated);
    assert_eq!(Leverage::from_debt_to_equity(1.5), Leverage::High);
  }

  #[test]
  fn test_financial_health() {
    let health = financial_health(&data()).unwrap();

    assert_approx_eq(health.current_ratio, 1.5, 1e-12);
    assert_approx_eq(health.quick_ratio, 1.0, 1e-12);
    assert_approx_eq(health.debt_to_equity, 0.5, 1e-12);
    assert_approx_eq(health.interest_coverage, 30.0, 1e-12);
    assert_eq!(health.free_cash_flow, 250.0);
    assert_approx_eq(health.fcf_margin, 0.25, 1e-12);
    // Liquidity 2, leverage 2, coverage 3
    assert_eq!(health.rating, HealthRating::Good);
  }

  #[test]
  fn test_health_rating_scores() {
    assert_eq!(HealthRating::from_ratios(2.0, 0.2, 20.0), HealthRating::Excellent);
    assert_eq!(HealthRating::from_ratios(0.8, 2.0, 1.0), HealthRating::Weak);
    assert_eq!(HealthRating::from_ratios(1.2, 2.0, 1.0), HealthRating::Moderate);
  }

  #[test]
  fn test_no_interest_expense_caps_coverage() {
    let mut data = data();
    data.income[0].interest_expense = None;
    assert_eq!(financial_health(&data).unwrap().interest_coverage, RATIO_CAP);
  }

  #[test]
  fn test_profitability_and_trends() {
    let mut data = data();
    data.income[0].gross_profit = Some(500.0);
    data.income[0].operating_income = Some(250.0);
    let profit = profitability(&data).unwrap();

    assert_approx_eq(profit.gross_margin, 0.5, 1e-12);
    assert_approx_eq(profit.operating_margin, 0.25, 1e-12);
    assert_approx_eq(profit.net_margin, 0.25, 1e-12);
    assert_approx_eq(profit.roe, 250.0 / 800.0, 1e-4);
    assert_approx_eq(profit.roa, 0.125, 1e-12);
    assert_eq!(profit.gross_margin_trend, Some(Trend::Improving));
    assert_eq!(profit.operating_margin_trend, Some(Trend::Declining));
    assert_eq!(profit.pricing_power, PricingPower::Healthy);

    data.income.truncate(2);
    assert_eq!(profitability(&data).unwrap().gross_margin_trend, None);
  }

  #[test]
  fn test_market_position() {
    let market = market_position(&data()).unwrap();

    // 4000 + 400 - 250
    assert_eq!(market.enterprise_value, 4150.0);
    // EPS 2.5
    assert_approx_eq(market.pe_ratio, 16.0, 1e-12);
    assert_approx_eq(market.ev_revenue, 4.15, 1e-12);
    assert_approx_eq(market.ev_ebitda, round2(4150.0 / 300.0), 1e-12);
    assert_eq!(market.valuation_tier, ValuationTier::Standard);

    let no_price = AnalysisData { price: None, ..data() };
    assert!(market_position(&no_price).is_none());
  }

  #[test]
  fn test_tiny_earnings_cap_pe() {
    let mut data = data();
    data.income[0].net_income = Some(0.1);
    assert_eq!(market_position(&data).unwrap().pe_ratio, RATIO_CAP);
  }

  #[test]
  fn test_risk_indicators() {
    let risk = risk_indicators(&data()).unwrap();

    assert_approx_eq(risk.cash_to_liabilities, 0.63, 1e-12);
    assert_approx_eq(risk.solvency_ratio, 0.4, 1e-12);
    // |1000/900 - 1| and |900/800 - 1|
    assert_approx_eq(risk.revenue_volatility, round4((100.0 / 900.0 + 0.125) / 2.0), 1e-12);
    assert_eq!(risk.risk_level, RiskLevel::Low);

    assert_eq!(RiskLevel::assess(0.4, 0.25), RiskLevel::Moderate);
    assert_eq!(RiskLevel::assess(0.6, 0.1), RiskLevel::Higher);
  }

  #[test]
  fn test_revenue_volatility_skips_zero_prior() {
    assert_eq!(revenue_volatility(&[100.0]), 0.0);
    assert_approx_eq(revenue_volatility(&[110.0, 100.0, 0.0]), 0.1, 1e-12);
  }

  #[test]
  fn test_analyze_without_data_has_no_sections() {
    let report = analyze("none", &AnalysisData::default());
    assert_eq!(report.ticker, "NONE");
    assert_eq!(report.section_count(), 0);
  }

  #[tokio::test]
  async fn test_analyzer_fetches_all_sections() {
    let d = data();
    let company = FixtureCompany {
      income_statements: d.income.clone(),
      balance_sheets: d.balance.clone(),
      cash_flow_statements: d.cash_flows.clone(),
      price: d.price.clone(),
      ..Default::default()
    };
    let analyzer = FinancialAnalyzer::new(Arc::new(FixtureDataSource::new().with_company("RDCO", company)));

    let report = analyzer.analyze("RDCO").await;
    assert_eq!(report.section_count(), 6);
    assert_eq!(report, analyze("RDCO", &d));
  }

  #[tokio::test]
  async fn test_analyzer_with_demo_income_only() {
    let analyzer = FinancialAnalyzer::new(Arc::new(FixtureDataSource::demo().unwrap()));
    let report = analyzer.analyze("NVDA").await;

    // Demo fixtures carry one income statement and nothing else
    assert!(report.rd_analysis.is_some());
    assert!(report.capital_structure.is_none());
    assert!(report.market_position.is_none());
  }
}
