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

use super::{format_money, format_pct, overrides};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use ipv_engine::export::{write_csv_file, write_json_file};
use ipv_engine::ValuationEngine;
use ipv_models::{IpAsset, PortfolioValuation};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ValueCommand {
  /// Company ticker
  #[arg(short, long)]
  ticker: String,

  /// JSON file holding an array of IP assets (or an object with an `assets` array)
  #[arg(short, long)]
  assets: PathBuf,

  /// Discount rate override, e.g. 0.10
  #[arg(long)]
  wacc: Option<f64>,

  /// Tax rate override, e.g. 0.21
  #[arg(long)]
  tax_rate: Option<f64>,

  /// Terminal growth override, e.g. 0.025
  #[arg(long)]
  terminal_growth: Option<f64>,

  /// Fiscal years of segment history to use
  #[arg(long, default_value = "5")]
  years: usize,

  /// Write the full valuation tree as JSON
  #[arg(long)]
  json: Option<PathBuf>,

  /// Write one row per segment valuation as CSV
  #[arg(long)]
  csv: Option<PathBuf>,
}

/// Read IP asset definitions from a JSON file
pub fn load_assets(path: &Path) -> Result<Vec<IpAsset>> {
  let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let value: Value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;

  let list = match value {
    Value::Object(mut map) if map.contains_key("assets") => map.remove("assets").unwrap_or_default(),
    other => other,
  };
  serde_json::from_value(list).with_context(|| format!("Invalid IP asset definitions in {}", path.display()))
}

pub async fn execute(cmd: ValueCommand, config: &Config) -> Result<()> {
  let assets = load_assets(&cmd.assets)?;
  let engine =
    ValuationEngine::new(config.data_source()?, config.engine_config().with_projection_years(cmd.years));

  let valuation = engine
    .value_ip_portfolio(&cmd.ticker, &assets, overrides(cmd.wacc, cmd.tax_rate, cmd.terminal_growth))
    .await
    .with_context(|| format!("Valuation failed for {}", cmd.ticker))?;

  print_valuation(&valuation);

  if let Some(path) = &cmd.json {
    write_json_file(&valuation, path).with_context(|| format!("Failed to write {}", path.display()))?;
  }
  if let Some(path) = &cmd.csv {
    write_csv_file(&valuation, path).with_context(|| format!("Failed to write {}", path.display()))?;
  }

  Ok(())
}

fn print_valuation(valuation: &PortfolioValuation) {
  let assumptions = &valuation.assumptions;
  println!("\nIP portfolio valuation: {}", valuation.ticker);
  println!(
    "WACC {}  tax {}  terminal growth {}",
    format_pct(assumptions.wacc),
    format_pct(assumptions.tax_rate),
    format_pct(assumptions.terminal_growth)
  );

  for asset in &valuation.asset_valuations {
    println!("\n{} [{}] {} ({})", asset.asset_id, asset.ip_type, asset.description, asset.method);
    for segment in &asset.segment_valuations {
      println!(
        "  {:<28} {:>6}  {:>14}",
        segment.segment,
        format_pct(segment.attribution_fraction),
        format_money(segment.total_value())
      );
    }
    println!("  {:<28} {:>6}  {:>14}", "Total", "", format_money(asset.total_value));
  }

  if !valuation.diagnostics.is_empty() {
    println!("\nSkipped:");
    for diagnostic in &valuation.diagnostics {
      match &diagnostic.segment {
        Some(segment) => println!("  {} / {}: {}", diagnostic.asset_id, segment, diagnostic.error),
        None => println!("  {}: {}", diagnostic.asset_id, diagnostic.error),
      }
    }
  }

  println!(
    "\nTotal portfolio value: {} across {} assets",
    format_money(valuation.total_portfolio_value),
    valuation.asset_count
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use ipv_models::ValuationMethod;
  use std::io::Write;

  const ASSETS: &str = r#"[
    {
      "id": "P1",
      "type": "patent",
      "description": "Multi-touch",
      "related_segments": [{"name": "IPhone", "attribution_pct": 0.2}],
      "royalty_rate": 0.05,
      "valuation_method": "relief_from_royalty"
    },
    {
      "id": "P2",
      "type": "patent",
      "description": "Chip design",
      "related_segments": [{"name": "Mac", "attribution_fraction": 0.4}],
      "royalty_rate": 0.04,
      "valuation_method": "technology_factor",
      "innovation_score": 0.9,
      "remaining_life_years": 12
    }
  ]"#;

  fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_load_asset_array() {
    let file = write_temp(ASSETS);
    let assets = load_assets(file.path()).unwrap();

    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0].related_segments[0].attribution_fraction, 0.2);
    assert_eq!(assets[1].valuation_method, ValuationMethod::TechnologyFactor);
    assert_eq!(assets[1].technology.innovation_score, Some(0.9));
    assert_eq!(assets[1].technology.total_legal_life_years, 20);
  }

  #[test]
  fn test_load_wrapped_assets() {
    let file = write_temp(&format!("{{\"assets\": {}}}", ASSETS));
    assert_eq!(load_assets(file.path()).unwrap().len(), 2);
  }

  #[test]
  fn test_bundled_demo_assets_parse() {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    assert_eq!(load_assets(&demos.join("aapl_assets.json")).unwrap().len(), 3);
    assert_eq!(load_assets(&demos.join("qcom_assets.json")).unwrap().len(), 2);
  }

  #[test]
  fn test_unknown_method_is_rejected() {
    let file = write_temp(&ASSETS.replace("technology_factor", "black_scholes"));
    let error = load_assets(file.path()).unwrap_err();
    assert!(format!("{:#}", error).contains("Unknown valuation method"));
  }

  #[tokio::test]
  async fn test_execute_writes_exports() {
    let dir = tempfile::tempdir().unwrap();
    let assets_path = dir.path().join("assets.json");
    std::fs::write(&assets_path, ASSETS).unwrap();

    let cmd = ValueCommand {
      ticker: "AAPL".to_string(),
      assets: assets_path,
      wacc: Some(0.10),
      tax_rate: None,
      terminal_growth: None,
      years: 5,
      json: Some(dir.path().join("out.json")),
      csv: Some(dir.path().join("out.csv")),
    };
    let config = Config { api_config: None, max_concurrent_requests: 2 };
    execute(cmd, &config).await.unwrap();

    let csv = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    let json = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let valuation = ipv_engine::from_json(&json).unwrap();
    assert_eq!(valuation.asset_count, 2);
    assert_eq!(valuation.assumptions.wacc, 0.10);
  }
}
