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
use ipv_engine::SegmentAllocator;

#[derive(Args, Debug)]
pub struct SegmentsCommand {
  /// Company ticker
  #[arg(short, long)]
  ticker: String,

  /// Fiscal years of segment history
  #[arg(long, default_value = "5")]
  years: usize,
}

pub async fn execute(cmd: SegmentsCommand, config: &Config) -> Result<()> {
  let allocator = SegmentAllocator::new(config.data_source()?);
  let breakdown = allocator
    .allocation_breakdown(&cmd.ticker, cmd.years)
    .await
    .with_context(|| format!("No segment data for {}", cmd.ticker))?;

  println!("\nSegment allocation: {}", cmd.ticker.to_uppercase());
  for period in &breakdown {
    let label = period.report_period.map(|d| d.to_string()).unwrap_or_else(|| "unknown period".to_string());
    println!("\n{}  consolidated revenue {}", label, format_money(period.consolidated_revenue));

    for dimension in &period.dimensions {
      let flag = if dimension.exceeds_consolidated { "  (overlapping disclosures)" } else { "" };
      println!("  {} - {}{}", dimension.dimension, format_pct(dimension.total_fraction), flag);
      for share in &dimension.segments {
        println!(
          "    {:<32} {:>14} {:>8}",
          share.segment,
          format_money(share.revenue),
          format_pct(share.allocation_fraction)
        );
      }
    }
  }

  Ok(())
}
