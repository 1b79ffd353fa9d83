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

use super::{impl_endpoint_base, ticker_params, DirectRateLimiter, EndpointBase};
use crate::transport::Transport;
use ipv_core::{Endpoint, Result};
use ipv_models::{FinancialMetricsSnapshotResponse, PriceSnapshotResponse};
use std::sync::Arc;
use tracing::instrument;

/// Market snapshot endpoints
pub struct MarketEndpoints {
  transport: Arc<Transport>,
  rate_limiter: Arc<DirectRateLimiter>,
}

impl MarketEndpoints {
  /// Create a new market endpoints instance
  pub fn new(transport: Arc<Transport>, rate_limiter: Arc<DirectRateLimiter>) -> Self {
    Self { transport, rate_limiter }
  }

  /// Latest price and market capitalization
  #[instrument(skip(self), fields(ticker))]
  pub async fn price_snapshot(&self, ticker: &str) -> Result<PriceSnapshotResponse> {
    self.wait_for_rate_limit().await?;
    self.transport.get(Endpoint::PriceSnapshot, ticker_params(ticker)).await
  }

  /// Current valuation ratios (P/E, P/S, EV/EBITDA)
  #[instrument(skip(self), fields(ticker))]
  pub async fn metrics_snapshot(&self, ticker: &str) -> Result<FinancialMetricsSnapshotResponse> {
    self.wait_for_rate_limit().await?;
    self.transport.get(Endpoint::FinancialMetricsSnapshot, ticker_params(ticker)).await
  }
}

impl_endpoint_base!(MarketEndpoints);
