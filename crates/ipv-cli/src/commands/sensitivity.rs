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
use ipv_engine::methods::RoyaltyInputs;
use ipv_engine::{compare_methods, sensitivity_analysis, MethodInputs, SensitivitySteps, ValuationEngine};
use ipv_models::TechnologyScores;

#[derive(Args, Debug)]
pub struct SensitivityCommand {
  /// Company ticker
  #[arg(short, long)]
  ticker: String,

  /// Segment label as reported, e.g. "IPhone"
  #[arg(short, long)]
  segment: String,

  /// Base royalty rate
  #[arg(long)]
  royalty_rate: f64,

  /// Share of the segment attributable to the IP
  #[arg(long)]
  attribution: f64,

  /// Discount rate override
  #[arg(long)]
  wacc: Option<f64>,

  /// Terminal growth override
  #[arg(long)]
  terminal_growth: Option<f64>,

  /// Fiscal years of segment history
  #[arg(long, default_value = "5")]
  years: usize,
}

pub async fn execute(cmd: SensitivityCommand, config: &Config) -> Result<()> {
  let engine = ValuationEngine::new(config.data_source()?, config.engine_config());

  let assumptions =
    engine.estimator().estimate(&cmd.ticker, &overrides(cmd.wacc, None, cmd.terminal_growth)).await.to_global();
  let profile = engine
    .allocator()
    .prepare_segment_financials(&cmd.ticker, &cmd.segment, cmd.years)
    .await
    .with_context(|| format!("Segment {} unavailable for {}", cmd.segment, cmd.ticker))?;

  let revenues = profile.revenues();
  let base = RoyaltyInputs {
    royalty_rate: cmd.royalty_rate,
    attribution_fraction: cmd.attribution,
    tax_rate: assumptions.tax_rate,
    wacc: assumptions.wacc,
    terminal_growth: assumptions.terminal_growth,
  };
  let report = sensitivity_analysis(&revenues, &base, &SensitivitySteps::default())
    .context("Sensitivity scenarios produced an invalid assumption")?;

  println!("\nRelief from Royalty sensitivity: {} / {}", profile.ticker, profile.segment);
  println!("Base value {}", format_money(report.base_value));
  println!("\n  {:<16} {:>9} {:>14} {:>9} {:>14} {:>8}", "Driver", "Low", "Value", "High", "Value", "Swing");
  for row in &report.rows {
    println!(
      "  {:<16} {:>9} {:>14} {:>9} {:>14} {:>7.1}%",
      row.driver.to_string(),
      format_pct(row.low_input),
      format_money(row.low_value),
      format_pct(row.high_input),
      format_money(row.high_value),
      row.swing_pct
    );
  }

  let scores = TechnologyScores::default();
  let comparison = compare_methods(
    &profile.attributed_revenues(cmd.attribution),
    &MethodInputs {
      royalty_rate: cmd.royalty_rate,
      operating_margin: profile.average_operating_margin().unwrap_or(0.0),
      technology: &scores,
      assumptions,
      config: engine.config(),
    },
  )?;

  println!("\nMethod comparison");
  for total in &comparison.totals {
    println!("  {:<22} {:>14}", total.method.to_string(), format_money(total.total_value));
  }
  println!("  {:<22} {:>14}", "Mean", format_money(comparison.mean_value));

  Ok(())
}
