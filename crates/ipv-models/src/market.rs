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

//! Market price and valuation-metric snapshots

use serde::{Deserialize, Serialize};

/// Latest traded price for a ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
  pub ticker: Option<String>,
  pub price: Option<f64>,
  pub market_cap: Option<f64>,
  pub time: Option<String>,
}

/// Envelope for the price snapshot endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshotResponse {
  pub snapshot: Option<PriceSnapshot>,
}

/// Point-in-time valuation ratios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetricsSnapshot {
  pub ticker: Option<String>,
  pub market_cap: Option<f64>,
  pub enterprise_value: Option<f64>,
  pub price_to_earnings_ratio: Option<f64>,
  pub price_to_sales_ratio: Option<f64>,
  pub enterprise_value_to_ebitda_ratio: Option<f64>,
}

/// Envelope for the financial metrics snapshot endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetricsSnapshotResponse {
  pub snapshot: Option<FinancialMetricsSnapshot>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_price_snapshot_deserialization() {
    let json = r#"{"snapshot": {"ticker": "MSFT", "price": 415.5, "market_cap": 3089000000000.0, "time": "2024-10-01T16:00:00Z"}}"#;
    let response: PriceSnapshotResponse = serde_json::from_str(json).unwrap();

    let snapshot = response.snapshot.unwrap();
    assert_eq!(snapshot.price, Some(415.5));
    assert_eq!(snapshot.market_cap, Some(3089000000000.0));
  }

  #[test]
  fn test_metrics_snapshot_missing_ratio() {
    let json = r#"{"snapshot": {"ticker": "TSLA", "market_cap": 700000000000.0}}"#;
    let response: FinancialMetricsSnapshotResponse = serde_json::from_str(json).unwrap();

    let snapshot = response.snapshot.unwrap();
    assert_eq!(snapshot.price_to_earnings_ratio, None);
  }
}
