//! # ipv-client
//!
//! Financial data sources for the IP valuation engine.
//!
//! ## Features
//!
//! - **One contract**: every source implements [`FinancialDataSource`]
//! - **HTTP client**: [`FinancialDatasetsClient`] talks to the Financial Datasets API
//!   with rate limiting and retry on transport errors
//! - **Offline fixtures**: [`FixtureDataSource`] serves bundled demo companies
//! - **Credit fallback**: [`FallbackDataSource`] switches to a secondary source once
//!   the provider reports exhausted credits
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ipv_client::{FallbackDataSource, FinancialDataSource, FinancialDatasetsClient, FixtureDataSource};
//! use ipv_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FinancialDatasetsClient::new(Config::from_env()?)?;
//!     let source = FallbackDataSource::new(client, FixtureDataSource::demo()?);
//!
//!     let statements = source.income_statements("AAPL", 5).await?;
//!     println!("{} annual periods", statements.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All methods return `Result<T, ipv_core::Error>`. "No data" is an empty vector or
//! `None`, never an error.

#![warn(clippy::all)]

pub mod client;
pub mod endpoints;
pub mod fixtures;
pub mod source;
pub mod transport;

pub use client::FinancialDatasetsClient;
pub use fixtures::{FixtureCompany, FixtureDataSource};
pub use ipv_core::{Config, Error, Result};
pub use source::{FallbackDataSource, FinancialDataSource};
