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

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod commands;
use commands::{
  analyze::AnalyzeCommand, assumptions::AssumptionsCommand, fair_value::FairValueCommand,
  segments::SegmentsCommand, sensitivity::SensitivityCommand, value::ValueCommand,
};

mod config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "ipv")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Use the bundled demo companies instead of the Financial Datasets API
  #[arg(long, global = true)]
  demo: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Value a portfolio of IP assets defined in a JSON file
  Value(ValueCommand),

  /// Estimate WACC, tax rate and terminal growth for a company
  Assumptions(AssumptionsCommand),

  /// Show each reported segment's share of consolidated revenue
  Segments(SegmentsCommand),

  /// DCF and multiples fair value per share
  FairValue(FairValueCommand),

  /// Relief from Royalty sensitivity for one segment
  Sensitivity(SensitivityCommand),

  /// Financial health, R&D and capital structure context for a company
  Analyze(AnalyzeCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenv().ok();

  let cli = Cli::parse();

  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  let config = config::Config::from_env(cli.demo)?;

  match cli.command {
    Commands::Value(cmd) => commands::value::execute(cmd, &config).await?,
    Commands::Assumptions(cmd) => commands::assumptions::execute(cmd, &config).await?,
    Commands::Segments(cmd) => commands::segments::execute(cmd, &config).await?,
    Commands::FairValue(cmd) => commands::fair_value::execute(cmd, &config).await?,
    Commands::Sensitivity(cmd) => commands::sensitivity::execute(cmd, &config).await?,
    Commands::Analyze(cmd) => commands::analyze::execute(cmd, &config).await?,
  }

  Ok(())
}
