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

//! Consolidated financial statement models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Annual income statement as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
  pub ticker: Option<String>,

  /// Fiscal period end date
  pub report_period: Option<NaiveDate>,

  /// "annual", "quarterly" or "ttm"
  pub period: Option<String>,

  pub currency: Option<String>,
  pub revenue: Option<f64>,
  pub gross_profit: Option<f64>,
  pub research_and_development: Option<f64>,
  pub operating_income: Option<f64>,
  pub interest_expense: Option<f64>,
  pub income_tax_expense: Option<f64>,
  pub net_income: Option<f64>,
}

/// Envelope for the income statements endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatementsResponse {
  #[serde(default)]
  pub income_statements: Vec<IncomeStatement>,
}

/// Annual balance sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
  pub ticker: Option<String>,
  pub report_period: Option<NaiveDate>,
  pub period: Option<String>,
  pub total_assets: Option<f64>,
  pub total_liabilities: Option<f64>,
  pub current_assets: Option<f64>,
  pub current_liabilities: Option<f64>,
  pub cash_and_equivalents: Option<f64>,
  pub trade_and_non_trade_receivables: Option<f64>,
  pub total_debt: Option<f64>,
  pub shareholders_equity: Option<f64>,
  pub outstanding_shares: Option<f64>,
}

/// Envelope for the balance sheets endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetsResponse {
  #[serde(default)]
  pub balance_sheets: Vec<BalanceSheet>,
}

/// Annual cash-flow statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
  pub ticker: Option<String>,
  pub report_period: Option<NaiveDate>,
  pub period: Option<String>,

  #[serde(alias = "net_cash_flow_from_operations")]
  pub operating_cash_flow: Option<f64>,

  /// Reported as a negative number (cash outflow)
  #[serde(alias = "capital_expenditure")]
  pub capital_expenditures: Option<f64>,
}

impl CashFlowStatement {
  /// Operating cash flow plus (negative) capital expenditures
  pub fn free_cash_flow(&self) -> f64 {
    self.operating_cash_flow.unwrap_or(0.0) + self.capital_expenditures.unwrap_or(0.0)
  }
}

/// Envelope for the cash-flow statements endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatementsResponse {
  #[serde(default)]
  pub cash_flow_statements: Vec<CashFlowStatement>,
}

/// One fiscal period of income statement and balance sheet data merged together.
///
/// Sequences of these are always ordered most-recent-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
  pub report_period: Option<NaiveDate>,
  pub revenue: Option<f64>,
  pub gross_profit: Option<f64>,
  pub operating_income: Option<f64>,
  pub research_and_development: Option<f64>,
  pub net_income: Option<f64>,
  pub income_tax_expense: Option<f64>,
  pub interest_expense: Option<f64>,
  pub total_debt: Option<f64>,
  pub shareholders_equity: Option<f64>,
  pub outstanding_shares: Option<f64>,
  pub cash_and_equivalents: Option<f64>,
  pub current_assets: Option<f64>,
  pub current_liabilities: Option<f64>,
}

impl FinancialStatement {
  /// Statement with only income statement fields populated
  pub fn from_income(income: &IncomeStatement) -> Self {
    Self {
      report_period: income.report_period,
      revenue: income.revenue,
      gross_profit: income.gross_profit,
      operating_income: income.operating_income,
      research_and_development: income.research_and_development,
      net_income: income.net_income,
      income_tax_expense: income.income_tax_expense,
      interest_expense: income.interest_expense,
      ..Default::default()
    }
  }

  /// Copy the balance sheet fields in
  pub fn with_balance_sheet(mut self, balance: &BalanceSheet) -> Self {
    self.total_debt = balance.total_debt;
    self.shareholders_equity = balance.shareholders_equity;
    self.outstanding_shares = balance.outstanding_shares;
    self.cash_and_equivalents = balance.cash_and_equivalents;
    self.current_assets = balance.current_assets;
    self.current_liabilities = balance.current_liabilities;
    self
  }

  /// Merge income statements with balance sheets.
  ///
  /// Balance sheets are matched by `report_period`; when the income statement has no
  /// period the balance sheet at the same position is used. Order follows `income`.
  pub fn combine(income: &[IncomeStatement], balance: &[BalanceSheet]) -> Vec<Self> {
    income
      .iter()
      .enumerate()
      .map(|(idx, statement)| {
        let matched = match statement.report_period {
          Some(period) => balance.iter().find(|b| b.report_period == Some(period)),
          None => balance.get(idx),
        };

        let merged = Self::from_income(statement);
        match matched {
          Some(sheet) => merged.with_balance_sheet(sheet),
          None => merged,
        }
      })
      .collect()
  }

  /// Whether any balance sheet field is populated
  pub fn has_balance_sheet(&self) -> bool {
    self.total_debt.is_some() || self.shareholders_equity.is_some() || self.outstanding_shares.is_some()
  }

  /// Net income plus income tax expense
  pub fn pretax_income(&self) -> f64 {
    self.net_income.unwrap_or(0.0) + self.income_tax_expense.unwrap_or(0.0)
  }
}
