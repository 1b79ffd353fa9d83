//! # ipv-models
//!
//! Data models shared by the IP valuation workspace.
//!
//! The crate holds two kinds of types:
//!
//! - **Provider payloads**: income statements, balance sheets, cash-flow statements,
//!   segmented revenues and market snapshots as returned by the Financial Datasets API
//! - **Valuation records**: IP asset definitions, assumption estimates and the
//!   segment / asset / portfolio result tree
//!
//! Every type round-trips through serde so results can be exported as JSON.
//!
//! ## Usage
//!
//! ```ignore
//! use ipv_models::financials::IncomeStatementsResponse;
//!
//! let response: IncomeStatementsResponse = serde_json::from_str(&body)?;
//! for statement in &response.income_statements {
//!     println!("{:?}: {:?}", statement.report_period, statement.revenue);
//! }
//! ```

#![warn(clippy::all)]

pub mod assumptions;
pub mod financials;
pub mod ip_asset;
pub mod market;
pub mod segments;
pub mod valuation;

pub use assumptions::*;
pub use financials::*;
pub use ip_asset::*;
pub use market::*;
pub use segments::*;
pub use valuation::*;

pub use chrono::NaiveDate;
