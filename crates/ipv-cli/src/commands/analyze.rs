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
use anyhow::Result;
use clap::Args;
use ipv_engine::{FinancialAnalysisReport, FinancialAnalyzer};

#[derive(Args, Debug)]
pub struct AnalyzeCommand {
  /// Company ticker
  #[arg(short, long)]
  ticker: String,
}

pub async fn execute(cmd: AnalyzeCommand, config: &Config) -> Result<()> {
  let analyzer = FinancialAnalyzer::new(config.data_source()?);
  let report = analyzer.analyze(&cmd.ticker).await;

  print_report(&report);
  Ok(())
}

fn print_report(report: &FinancialAnalysisReport) {
  println!("\nFinancial analysis: {}", report.ticker);

  if let Some(health) = &report.financial_health {
    println!("\nFinancial health");
    println!("  current ratio {:.2}  quick ratio {:.2}", health.current_ratio, health.quick_ratio);
    println!("  debt/equity {:.2}  interest coverage {:.2}", health.debt_to_equity, health.interest_coverage);
    println!("  free cash flow {} ({})", format_money(health.free_cash_flow), format_pct(health.fcf_margin));
    println!("  {}", health.rating);
  }

  if let Some(profit) = &report.profitability {
    println!("\nProfitability");
    println!(
      "  gross {}  operating {}  net {}",
      format_pct(profit.gross_margin),
      format_pct(profit.operating_margin),
      format_pct(profit.net_margin)
    );
    println!("  ROE {}  ROA {}", format_pct(profit.roe), format_pct(profit.roa));
    if let (Some(gross), Some(operating)) = (profit.gross_margin_trend, profit.operating_margin_trend) {
      println!("  gross margin {:?}, operating margin {:?}", gross, operating);
    }
    println!("  {}", profit.pricing_power);
  }

  if let Some(rd) = &report.rd_analysis {
    println!("\nR&D");
    println!(
      "  intensity {}  latest spend {}  growth {}",
      format_pct(rd.rd_intensity),
      format_money(rd.latest_rd_spend),
      format_pct(rd.rd_growth_rate)
    );
    println!("  IP generation potential: {}", rd.ip_generation_potential);
  }

  if let Some(capital) = &report.capital_structure {
    println!("\nCapital structure");
    println!(
      "  debt {}  equity {}  market cap {}",
      format_money(capital.total_debt),
      format_money(capital.shareholders_equity),
      format_money(capital.market_cap)
    );
    println!(
      "  debt/assets {:.2}  debt/equity {:.2}  market/book {:.2}",
      capital.debt_to_assets, capital.debt_to_equity, capital.market_to_book
    );
    println!("  {}", capital.leverage);
  }

  if let Some(market) = &report.market_position {
    println!("\nMarket position");
    println!("  EV {}  P/E {:.2}", format_money(market.enterprise_value), market.pe_ratio);
    println!("  EV/revenue {:.2}  EV/EBITDA {:.2}", market.ev_revenue, market.ev_ebitda);
    println!("  {}", market.valuation_tier);
  }

  if let Some(risk) = &report.risk_indicators {
    println!("\nRisk");
    println!(
      "  cash/current liabilities {:.2}  solvency {}  revenue volatility {}",
      risk.cash_to_liabilities,
      format_pct(risk.solvency_ratio),
      format_pct(risk.revenue_volatility)
    );
    println!("  {}", risk.risk_level);
  }

  if report.section_count() == 0 {
    println!("\nNo financial data available");
  }
}
