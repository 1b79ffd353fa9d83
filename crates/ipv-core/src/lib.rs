pub mod config;
pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use error::{Error, Result};

/// Financial Datasets endpoints consumed by the valuation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
  // Financial statements
  IncomeStatements,
  BalanceSheets,
  CashFlowStatements,
  SegmentedRevenues,

  // Market snapshots
  PriceSnapshot,
  FinancialMetricsSnapshot,
}

impl Endpoint {
  /// URL path relative to the provider base URL
  pub fn path(&self) -> &'static str {
    match self {
      Endpoint::IncomeStatements => "/financials/income-statements/",
      Endpoint::BalanceSheets => "/financials/balance-sheets/",
      Endpoint::CashFlowStatements => "/financials/cash-flow-statements/",
      Endpoint::SegmentedRevenues => "/financials/segmented-revenues/",
      Endpoint::PriceSnapshot => "/prices/snapshot/",
      Endpoint::FinancialMetricsSnapshot => "/financial-metrics/snapshot/",
    }
  }

  /// Whether the endpoint takes `period` and `limit` query parameters
  pub fn is_periodic(&self) -> bool {
    !matches!(self, Endpoint::PriceSnapshot | Endpoint::FinancialMetricsSnapshot)
  }
}

impl std::fmt::Display for Endpoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Endpoint::IncomeStatements => write!(f, "INCOME_STATEMENTS"),
      Endpoint::BalanceSheets => write!(f, "BALANCE_SHEETS"),
      Endpoint::CashFlowStatements => write!(f, "CASH_FLOW_STATEMENTS"),
      Endpoint::SegmentedRevenues => write!(f, "SEGMENTED_REVENUES"),
      Endpoint::PriceSnapshot => write!(f, "PRICE_SNAPSHOT"),
      Endpoint::FinancialMetricsSnapshot => write!(f, "FINANCIAL_METRICS_SNAPSHOT"),
    }
  }
}

/// Financial Datasets API base URL
pub const FINANCIAL_DATASETS_BASE_URL: &str = "https://api.financialdatasets.ai";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Default rate limit (requests per minute)
pub const DEFAULT_RATE_LIMIT: u32 = 60;

/// Reporting period requested from the provider
pub const ANNUAL_PERIOD: &str = "annual";

/// Number of forecast years used when the caller does not choose one
pub const DEFAULT_PROJECTION_YEARS: usize = 5;
