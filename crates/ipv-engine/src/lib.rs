//! # ipv-engine
//!
//! Valuation of intellectual property from a company's segment disclosures.
//!
//! ## Components
//!
//! - **Segment allocation** ([`SegmentAllocator`]): pushes consolidated statements down
//!   to a business segment by its share of revenue, with an injected profile cache
//! - **Assumption estimation** ([`AssumptionEstimator`]): effective tax rate, CAPM-based
//!   WACC and terminal growth, each falling back to a documented default
//! - **Valuation methods** ([`methods`]): Relief from Royalty, Multi-Period Excess
//!   Earnings and Technology Factor
//! - **Orchestration** ([`ValuationEngine`]): asset and portfolio valuations with
//!   per-segment diagnostics
//! - **Fair value** ([`FairValueCalculator`]): DCF and multiples cross-check of the
//!   share price
//! - **Financial analysis** ([`FinancialAnalyzer`]): health, profitability, R&D intensity,
//!   capital structure, market position and risk views of the company
//! - **Analysis and export**: sensitivity tables, method comparison, CSV and JSON output
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ipv_client::FixtureDataSource;
//! use ipv_engine::{EngineConfig, ValuationEngine};
//! use ipv_models::{AssumptionOverrides, IpAsset, IpType, ValuationMethod};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ValuationEngine::new(Arc::new(FixtureDataSource::demo()?), EngineConfig::default());
//!
//!     let patent = IpAsset::new("P1", IpType::Patent, "Multi-touch", 0.05, ValuationMethod::ReliefFromRoyalty)
//!         .with_segment("IPhone", 0.2);
//!     let portfolio = engine.value_ip_portfolio("AAPL", &[patent], AssumptionOverrides::default()).await?;
//!
//!     println!("{}: {:.0}", portfolio.ticker, portfolio.total_portfolio_value);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod allocator;
pub mod analysis;
pub mod assumptions;
pub mod cache;
pub mod config;
pub mod export;
pub mod fair_value;
pub mod financial_analysis;
pub mod methods;
pub mod portfolio;

pub use allocator::{allocate_segment, PeriodAllocation, SegmentAllocator};
pub use analysis::{compare_methods, sensitivity_analysis, MethodComparison, SensitivityReport, SensitivitySteps};
pub use assumptions::{estimate_assumptions, AssumptionEstimator};
pub use cache::{CacheConfig, InMemoryProfileCache, ProfileCache, SegmentKey};
pub use config::EngineConfig;
pub use export::{from_json, to_json, write_csv};
pub use fair_value::{FairValueCalculator, FairValueInputs, FairValueReport, Recommendation};
pub use financial_analysis::{analyze, AnalysisData, FinancialAnalysisReport, FinancialAnalyzer};
pub use methods::{run_method, MethodInputs};
pub use portfolio::ValuationEngine;

pub use ipv_core::{Error, Result};
