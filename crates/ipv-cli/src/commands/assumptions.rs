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
use anyhow::Result;
use clap::Args;
use ipv_engine::AssumptionEstimator;
use ipv_models::AssumptionSet;

#[derive(Args, Debug)]
pub struct AssumptionsCommand {
  /// Company ticker
  #[arg(short, long)]
  ticker: String,

  /// Discount rate override
  #[arg(long)]
  wacc: Option<f64>,

  /// Tax rate override
  #[arg(long)]
  tax_rate: Option<f64>,

  /// Terminal growth override
  #[arg(long)]
  terminal_growth: Option<f64>,
}

pub async fn execute(cmd: AssumptionsCommand, config: &Config) -> Result<()> {
  let estimator = AssumptionEstimator::new(config.data_source()?);
  let assumptions =
    estimator.estimate(&cmd.ticker, &overrides(cmd.wacc, cmd.tax_rate, cmd.terminal_growth)).await;

  print_assumptions(&cmd.ticker.to_uppercase(), &assumptions);
  Ok(())
}

fn print_assumptions(ticker: &str, assumptions: &AssumptionSet) {
  println!("\nValuation assumptions: {}", ticker);

  let tax = &assumptions.tax_rate;
  println!("\nTax rate         {:>8}  ({:?})", format_pct(tax.effective_tax_rate), tax.source);
  println!("  {}", tax.note);

  let wacc = &assumptions.wacc;
  println!("\nWACC             {:>8}  ({:?})", format_pct(wacc.wacc), wacc.source);
  println!("  {}", wacc.note);
  if let Some(components) = &wacc.components {
    println!(
      "  market cap {}  debt {}  beta {:.2}",
      format_money(components.market_cap),
      format_money(components.total_debt),
      components.beta
    );
    println!(
      "  cost of equity {}  cost of debt {}  weights E {} / D {}",
      format_pct(components.cost_of_equity),
      format_pct(components.cost_of_debt),
      format_pct(components.equity_weight),
      format_pct(components.debt_weight)
    );
  }

  let growth = &assumptions.terminal_growth;
  println!("\nTerminal growth  {:>8}  ({:?})", format_pct(growth.terminal_growth), growth.source);
  println!("  {}", growth.note);
  if let Some(avg) = growth.historical_avg_growth {
    println!("  historical average {}", format_pct(avg));
  }
}
