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

use anyhow::{Context, Result};
use ipv_client::{FallbackDataSource, FinancialDataSource, FinancialDatasetsClient, FixtureDataSource};
use ipv_core::Config as CoreConfig;
use ipv_engine::EngineConfig;
use std::env;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
  /// Provider settings; `None` in demo mode
  pub api_config: Option<CoreConfig>,

  /// Segment valuations in flight at once
  pub max_concurrent_requests: usize,
}

impl Config {
  pub fn from_env(demo: bool) -> Result<Self> {
    let api_config = if demo {
      None
    } else {
      Some(CoreConfig::from_env().context("FINANCIAL_DATASETS_API_KEY must be set unless --demo is used")?)
    };

    let max_concurrent_requests = env::var("IPV_MAX_CONCURRENT")
      .unwrap_or_else(|_| "4".to_string())
      .parse()
      .context("IPV_MAX_CONCURRENT must be a positive integer")?;

    Ok(Self { api_config, max_concurrent_requests })
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig::default().with_max_concurrent_requests(self.max_concurrent_requests)
  }

  /// Live provider with the demo fixtures behind it, or the fixtures alone in demo mode
  pub fn data_source(&self) -> Result<Arc<dyn FinancialDataSource>> {
    let fixtures = FixtureDataSource::demo().context("Failed to load demo fixtures")?;

    match &self.api_config {
      None => {
        info!("Demo mode: using fixture data for {}", fixtures.tickers().join(", "));
        Ok(Arc::new(fixtures))
      }
      Some(api_config) => {
        let client =
          FinancialDatasetsClient::new(api_config.clone()).context("Failed to build Financial Datasets client")?;
        Ok(Arc::new(FallbackDataSource::new(client, fixtures)))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_demo_config_needs_no_key() {
    let config = Config { api_config: None, max_concurrent_requests: 4 };
    let source = config.data_source().unwrap();
    assert_eq!(source.name(), "demo-fixtures");
    assert_eq!(config.engine_config().max_concurrent_requests, 4);
  }

  #[test]
  fn test_live_config_wraps_fixtures() {
    let config = Config {
      api_config: Some(CoreConfig::default_with_key("test_key".to_string())),
      max_concurrent_requests: 4,
    };
    assert!(config.data_source().is_ok());
  }
}
