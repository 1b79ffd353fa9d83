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

use super::{impl_endpoint_base, statement_params, DirectRateLimiter, EndpointBase};
use crate::transport::Transport;
use ipv_core::{Endpoint, Result};
use ipv_models::{
  BalanceSheetsResponse, CashFlowStatementsResponse, IncomeStatementsResponse,
  SegmentedRevenuesResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Financial statement endpoints
///
/// All requests ask for annual statements, most recent first.
pub struct FinancialsEndpoints {
  transport: Arc<Transport>,
  rate_limiter: Arc<DirectRateLimiter>,
}

impl FinancialsEndpoints {
  /// Create a new financials endpoints instance
  pub fn new(transport: Arc<Transport>, rate_limiter: Arc<DirectRateLimiter>) -> Self {
    Self { transport, rate_limiter }
  }

  /// Get annual income statements
  ///
  /// # Arguments
  ///
  /// * `ticker` - The stock symbol (e.g., "AAPL", "MSFT")
  /// * `limit` - Maximum number of periods to return
  ///
  /// # Examples
  ///
  /// ```rust,ignore
  /// let response = client.financials().income_statements("AAPL", 5).await?;
  /// for statement in &response.income_statements {
  ///     println!("{:?}: {:?}", statement.report_period, statement.revenue);
  /// }
  /// ```
  #[instrument(skip(self), fields(ticker))]
  pub async fn income_statements(&self, ticker: &str, limit: usize) -> Result<IncomeStatementsResponse> {
    self.wait_for_rate_limit().await?;
    self.transport.get(Endpoint::IncomeStatements, statement_params(ticker, limit)).await
  }

  /// Get annual balance sheets
  #[instrument(skip(self), fields(ticker))]
  pub async fn balance_sheets(&self, ticker: &str, limit: usize) -> Result<BalanceSheetsResponse> {
    self.wait_for_rate_limit().await?;
    self.transport.get(Endpoint::BalanceSheets, statement_params(ticker, limit)).await
  }

  /// Get annual cash-flow statements
  #[instrument(skip(self), fields(ticker))]
  pub async fn cash_flow_statements(
    &self,
    ticker: &str,
    limit: usize,
  ) -> Result<CashFlowStatementsResponse> {
    self.wait_for_rate_limit().await?;
    self.transport.get(Endpoint::CashFlowStatements, statement_params(ticker, limit)).await
  }

  /// Get revenue broken down by reported segment
  ///
  /// Each period carries the line items of every disclosed dimension (product, business
  /// segment, geography), so labels from several breakdowns appear side by side.
  #[instrument(skip(self), fields(ticker))]
  pub async fn segmented_revenues(
    &self,
    ticker: &str,
    limit: usize,
  ) -> Result<SegmentedRevenuesResponse> {
    self.wait_for_rate_limit().await?;
    self.transport.get(Endpoint::SegmentedRevenues, statement_params(ticker, limit)).await
  }
}

impl_endpoint_base!(FinancialsEndpoints);
