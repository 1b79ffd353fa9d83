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

//! CSV and JSON export of portfolio valuations

use ipv_core::{Error, Result};
use ipv_models::{ExportRow, PortfolioValuation};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write rows as CSV with a header line
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<()> {
  let mut csv_writer = csv::Writer::from_writer(writer);
  for row in rows {
    csv_writer.serialize(row).map_err(|e| Error::Export(e.to_string()))?;
  }
  csv_writer.flush().map_err(|e| Error::Export(e.to_string()))
}

/// Write a portfolio's segment rows to a CSV file
pub fn write_csv_file<P: AsRef<Path>>(valuation: &PortfolioValuation, path: P) -> Result<usize> {
  let path = path.as_ref();
  let file = File::create(path).map_err(|e| Error::Export(format!("{}: {}", path.display(), e)))?;

  let rows = valuation.export_rows();
  write_csv(&rows, file)?;
  info!("Wrote {} rows to {}", rows.len(), path.display());
  Ok(rows.len())
}

/// Pretty-printed JSON of the full valuation tree
pub fn to_json(valuation: &PortfolioValuation) -> Result<String> {
  Ok(serde_json::to_string_pretty(valuation)?)
}

pub fn from_json(json: &str) -> Result<PortfolioValuation> {
  Ok(serde_json::from_str(json)?)
}

pub fn write_json_file<P: AsRef<Path>>(valuation: &PortfolioValuation, path: P) -> Result<()> {
  let path = path.as_ref();
  std::fs::write(path, to_json(valuation)?).map_err(|e| Error::Export(format!("{}: {}", path.display(), e)))?;
  info!("Wrote valuation to {}", path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{EngineConfig, ValuationEngine};
  use ipv_client::FixtureDataSource;
  use ipv_models::{AssumptionOverrides, IpAsset, IpType, ValuationMethod};
  use std::sync::Arc;

  async fn portfolio() -> PortfolioValuation {
    let engine = ValuationEngine::new(Arc::new(FixtureDataSource::demo().unwrap()), EngineConfig::default());
    let assets = vec![
      IpAsset::new("P1", IpType::Patent, "Touch input, multi-touch", 0.05, ValuationMethod::ReliefFromRoyalty)
        .with_segment("IPhone", 0.2)
        .with_segment("IPad", 0.3),
      IpAsset::new("T1", IpType::Trademark, "Brand", 0.02, ValuationMethod::ExcessEarnings)
        .with_segment("Services", 0.1),
    ];
    engine.value_ip_portfolio("AAPL", &assets, AssumptionOverrides::default()).await.unwrap()
  }

  #[tokio::test]
  async fn test_csv_rows() {
    let valuation = portfolio().await;
    let mut buffer = Vec::new();
    write_csv(&valuation.export_rows(), &mut buffer).unwrap();

    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "asset_id,ip_type,description,segment,total_value,method,attribution_fraction");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("P1,patent,\"Touch input, multi-touch\",IPhone,"));
    assert!(lines[1].ends_with(",relief_from_royalty,0.2"));
    assert!(lines[3].starts_with("T1,trademark,Brand,Services,"));
  }

  #[tokio::test]
  async fn test_json_round_trip() {
    let valuation = portfolio().await;
    let back = from_json(&to_json(&valuation).unwrap()).unwrap();
    assert_eq!(back, valuation);
  }

  #[tokio::test]
  async fn test_file_exports() {
    let valuation = portfolio().await;
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("portfolio.csv");
    assert_eq!(write_csv_file(&valuation, &csv_path).unwrap(), 3);
    assert!(std::fs::read_to_string(&csv_path).unwrap().contains("IPad"));

    let json_path = dir.path().join("portfolio.json");
    write_json_file(&valuation, &json_path).unwrap();
    let back = from_json(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(back.asset_count, 2);
  }

  #[test]
  fn test_malformed_json() {
    assert!(matches!(from_json("{\"ticker\": 1}"), Err(Error::Serde(_))));
  }
}
