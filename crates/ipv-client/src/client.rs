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

use crate::endpoints::{financials::FinancialsEndpoints, market::MarketEndpoints, DirectRateLimiter};
use crate::transport::Transport;
use governor::{Quota, RateLimiter};
use ipv_core::{Config, Result};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Main Financial Datasets API client
///
/// Provides access to the statement and market snapshot endpoints through organized
/// endpoint groups. Handles authentication, rate limiting, and transport concerns.
///
/// # Examples
///
/// ```ignore
/// use ipv_client::FinancialDatasetsClient;
/// use ipv_core::Config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = FinancialDatasetsClient::new(Config::from_env()?)?;
///
///     let statements = client.financials().income_statements("AAPL", 5).await?;
///     println!("{} periods", statements.income_statements.len());
///
///     let price = client.market().price_snapshot("AAPL").await?;
///     println!("{:?}", price.snapshot);
///
///     Ok(())
/// }
/// ```
pub struct FinancialDatasetsClient {
  rate_limiter: Arc<DirectRateLimiter>,
  transport: Arc<Transport>,
}

impl FinancialDatasetsClient {
  /// Create a new client
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn new(config: Config) -> Result<Self> {
    let rate_limit = NonZeroU32::new(config.rate_limit)
      .or_else(|| NonZeroU32::new(ipv_core::DEFAULT_RATE_LIMIT))
      .unwrap_or(NonZeroU32::MIN);
    let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rate_limit)));

    let transport = Arc::new(Transport::new(&config)?);

    Ok(Self { transport, rate_limiter })
  }

  /// Create a new client with custom rate limiting
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn with_rate_limiter(config: Config, rate_limiter: Arc<DirectRateLimiter>) -> Result<Self> {
    Ok(Self { transport: Arc::new(Transport::new(&config)?), rate_limiter })
  }

  /// Income statements, balance sheets, cash flows and segmented revenues
  pub fn financials(&self) -> FinancialsEndpoints {
    FinancialsEndpoints::new(self.transport.clone(), self.rate_limiter.clone())
  }

  /// Price and valuation-metric snapshots
  pub fn market(&self) -> MarketEndpoints {
    MarketEndpoints::new(self.transport.clone(), self.rate_limiter.clone())
  }

  /// Base URL requests are sent to
  pub fn base_url(&self) -> &str {
    self.transport.base_url()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_client_creation() {
    let config = Config::default_with_key("test_key".to_string());
    let client = FinancialDatasetsClient::new(config).unwrap();
    assert_eq!(client.base_url(), ipv_core::FINANCIAL_DATASETS_BASE_URL);
  }

  #[test]
  fn test_zero_rate_limit_falls_back() {
    let mut config = Config::default_with_key("test_key".to_string());
    config.rate_limit = 0;
    assert!(FinancialDatasetsClient::new(config).is_ok());
  }

  #[test]
  fn test_trailing_slash_trimmed() {
    let config = Config::default_with_key("k".to_string()).with_base_url("http://localhost:8080/");
    let client = FinancialDatasetsClient::new(config).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
  }
}
