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

use super::{format_money, format_pct};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use ipv_engine::fair_value::DEFAULT_FAIR_VALUE_TERMINAL_GROWTH;
use ipv_engine::{FairValueCalculator, FairValueInputs, FairValueReport};

#[derive(Args, Debug)]
pub struct FairValueCommand {
  /// Company ticker
  #[arg(short, long)]
  ticker: String,

  /// Cash flow growth for the DCF; estimated from revenue history when omitted
  #[arg(long)]
  growth: Option<f64>,

  /// Perpetual growth after year five
  #[arg(long, default_value_t = DEFAULT_FAIR_VALUE_TERMINAL_GROWTH)]
  terminal_growth: f64,

  /// Discount rate, 10% when omitted
  #[arg(long)]
  wacc: Option<f64>,
}

pub async fn execute(cmd: FairValueCommand, config: &Config) -> Result<()> {
  let calculator = FairValueCalculator::new(config.data_source()?);
  let inputs = FairValueInputs { growth_rate: cmd.growth, terminal_growth: cmd.terminal_growth, wacc: cmd.wacc };

  let report = calculator
    .calculate(&cmd.ticker, &inputs)
    .await
    .with_context(|| format!("Fair value calculation failed for {}", cmd.ticker))?;

  print_report(&report);
  Ok(())
}

fn print_report(report: &FairValueReport) {
  println!("\nFair value: {}", report.ticker);
  println!(
    "growth {}  terminal growth {}  WACC {}",
    format_pct(report.growth_rate),
    format_pct(report.terminal_growth),
    format_pct(report.wacc)
  );

  println!();
  for estimate in &report.estimates {
    println!("  {:<14} {:>12.2} per share", estimate.method.to_string(), estimate.fair_value_per_share);
    if let Some(ev) = estimate.enterprise_value {
      println!("  {:<14} EV {}", "", format_money(ev));
    }
  }
  for skipped in &report.skipped {
    println!("  {:<14} skipped: {}", skipped.method.to_string(), skipped.reason);
  }

  println!("\nAverage fair value  {:.2}", report.fair_value_average);
  if report.current_price > 0.0 {
    println!("Current price       {:.2}  ({:+.1}%)", report.current_price, report.upside_pct);
  } else {
    println!("Current price       unavailable");
  }
  println!("Recommendation      {}", report.recommendation);
}
