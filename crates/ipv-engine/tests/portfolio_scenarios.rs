use async_trait::async_trait;
use ipv_client::{FinancialDataSource, FixtureCompany, FixtureDataSource};
use ipv_core::test_utils::{assert_approx_zero, assert_relative_eq};
use ipv_core::{Error, Result};
use ipv_engine::assumptions::round4;
use ipv_engine::methods::{relief_from_royalty, RoyaltyInputs};
use ipv_engine::{AssumptionEstimator, EngineConfig, ValuationEngine};
use ipv_models::{
  AssumptionOverrides, BalanceSheet, CashFlowStatement, EstimateSource, FinancialMetricsSnapshot,
  GlobalAssumptions, IncomeStatement, IpAsset, IpType, PriceSnapshot, SegmentedRevenues, TechnologyScores,
  ValuationMethod,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Three fiscal years, most recent first, where the "Widgets" segment earned 100, 110, 121
fn growth_company() -> FixtureCompany {
  serde_json::from_value(json!({
    "name": "Growth Co",
    "income_statements": [
      {"report_period": "2024-12-31", "revenue": 200.0, "gross_profit": 80.0, "operating_income": 60.0},
      {"report_period": "2023-12-31", "revenue": 220.0, "gross_profit": 88.0, "operating_income": 66.0},
      {"report_period": "2022-12-31", "revenue": 242.0, "gross_profit": 96.8, "operating_income": 72.6}
    ],
    "segmented_revenues": [
      {"report_period": "2024-12-31", "items": [
        {"name": "Revenue", "amount": 100.0, "segments": [{"label": "Widgets", "type": "Product or Service"}]},
        {"name": "Revenue", "amount": 100.0, "segments": [{"label": "Gadgets", "type": "Product or Service"}]}
      ]},
      {"report_period": "2023-12-31", "items": [
        {"name": "Revenue", "amount": 110.0, "segments": [{"label": "Widgets", "type": "Product or Service"}]}
      ]},
      {"report_period": "2022-12-31", "items": [
        {"name": "Revenue", "amount": 121.0, "segments": [{"label": "Widgets", "type": "Product or Service"}]}
      ]}
    ]
  }))
  .unwrap()
}

fn fixed_assumptions() -> AssumptionOverrides {
  AssumptionOverrides { wacc: Some(0.10), tax_rate: Some(0.21), terminal_growth: Some(0.02) }
}

fn demo_engine() -> ValuationEngine {
  ValuationEngine::new(Arc::new(FixtureDataSource::demo().unwrap()), EngineConfig::default())
}

/// Counts segment fetches on top of a fixture source
struct CountingSource {
  inner: FixtureDataSource,
  segment_fetches: AtomicUsize,
}

#[async_trait]
impl FinancialDataSource for CountingSource {
  async fn income_statements(&self, ticker: &str, limit: usize) -> Result<Vec<IncomeStatement>> {
    self.inner.income_statements(ticker, limit).await
  }

  async fn balance_sheets(&self, ticker: &str, limit: usize) -> Result<Vec<BalanceSheet>> {
    self.inner.balance_sheets(ticker, limit).await
  }

  async fn cash_flow_statements(&self, ticker: &str, limit: usize) -> Result<Vec<CashFlowStatement>> {
    self.inner.cash_flow_statements(ticker, limit).await
  }

  async fn segmented_revenues(&self, ticker: &str, limit: usize) -> Result<Vec<SegmentedRevenues>> {
    self.segment_fetches.fetch_add(1, Ordering::SeqCst);
    self.inner.segmented_revenues(ticker, limit).await
  }

  async fn price_snapshot(&self, ticker: &str) -> Result<Option<PriceSnapshot>> {
    self.inner.price_snapshot(ticker).await
  }

  async fn metrics_snapshot(&self, ticker: &str) -> Result<Option<FinancialMetricsSnapshot>> {
    self.inner.metrics_snapshot(ticker).await
  }

  fn name(&self) -> &str {
    "counting"
  }
}

#[tokio::test]
async fn scenario_a_three_year_relief_from_royalty() {
  let source = FixtureDataSource::new().with_company("GROW", growth_company());
  let engine = ValuationEngine::new(Arc::new(source), EngineConfig::default());
  let asset = IpAsset::new("P1", IpType::Patent, "Widget process", 0.05, ValuationMethod::ReliefFromRoyalty)
    .with_segment("Widgets", 1.0);

  let portfolio = engine.value_ip_portfolio("GROW", &[asset], fixed_assumptions()).await.unwrap();
  let segment = &portfolio.asset_valuations[0].segment_valuations[0];

  assert_eq!(segment.profile.revenues(), vec![100.0, 110.0, 121.0]);
  assert_relative_eq(segment.result.yearly_details[0].cash_flow, 3.95, 1e-12);
  assert_relative_eq(segment.result.yearly_details[0].present_value, 3.591, 1e-4);

  let explicit: f64 = [100.0, 110.0, 121.0]
    .iter()
    .enumerate()
    .map(|(i, revenue)| revenue * 0.05 * 0.79 / 1.1f64.powi(i as i32 + 1))
    .sum();
  let terminal = 121.0 * 1.02 * 0.05 * 0.79 / (0.10 - 0.02) / 1.1f64.powi(3);
  assert_relative_eq(portfolio.total_portfolio_value, explicit + terminal, 1e-6);
}

#[tokio::test]
async fn scenario_b_attributions_add_up() {
  let engine = demo_engine();
  let assumptions = GlobalAssumptions::default();

  let both = IpAsset::new("P1", IpType::Patent, "Multi-touch", 0.05, ValuationMethod::ReliefFromRoyalty)
    .with_segment("IPhone", 0.2)
    .with_segment("IPad", 0.3);
  let iphone_only = IpAsset { related_segments: both.related_segments[..1].to_vec(), ..both.clone() };
  let ipad_only = IpAsset { related_segments: both.related_segments[1..].to_vec(), ..both.clone() };

  let combined = engine.value_ip_asset("AAPL", &both, &assumptions).await.unwrap();
  let iphone = engine.value_ip_asset("AAPL", &iphone_only, &assumptions).await.unwrap();
  let ipad = engine.value_ip_asset("AAPL", &ipad_only, &assumptions).await.unwrap();

  assert!(iphone.total_value > 0.0 && ipad.total_value > 0.0);
  assert_relative_eq(combined.total_value, iphone.total_value + ipad.total_value, 1e-12);

  let portfolio = engine
    .value_ip_portfolio(
      "AAPL",
      &[both],
      AssumptionOverrides { wacc: Some(0.10), tax_rate: Some(0.21), terminal_growth: Some(0.02) },
    )
    .await
    .unwrap();
  assert_relative_eq(portfolio.total_portfolio_value, iphone.total_value + ipad.total_value, 1e-12);
}

#[tokio::test]
async fn scenario_c_unknown_segment_is_skipped() {
  let engine = demo_engine();
  let assumptions = GlobalAssumptions::default();

  let asset = IpAsset::new("T1", IpType::Trademark, "Brand", 0.03, ValuationMethod::ReliefFromRoyalty)
    .with_segment("Services", 0.5)
    .with_segment("Flying Cars", 0.5);
  let valuation = engine.value_ip_asset("AAPL", &asset, &assumptions).await.unwrap();

  assert_eq!(valuation.segment_valuations.len(), 1);
  assert_eq!(valuation.diagnostics.len(), 1);
  assert_eq!(valuation.diagnostics[0].segment.as_deref(), Some("Flying Cars"));

  let services_only = IpAsset { related_segments: asset.related_segments[..1].to_vec(), ..asset.clone() };
  let expected = engine.value_ip_asset("AAPL", &services_only, &assumptions).await.unwrap();
  assert_relative_eq(valuation.total_value, expected.total_value, 1e-15);
}

#[tokio::test]
async fn identical_requests_fetch_once() {
  let source = Arc::new(CountingSource { inner: FixtureDataSource::demo().unwrap(), segment_fetches: AtomicUsize::new(0) });
  let engine = ValuationEngine::new(source.clone(), EngineConfig::default());

  let a = engine.allocator().prepare_segment_financials("AAPL", "IPhone", 5).await.unwrap();
  let b = engine.allocator().prepare_segment_financials("AAPL", "IPhone", 5).await.unwrap();

  assert!(Arc::ptr_eq(&a, &b));
  assert_eq!(source.segment_fetches.load(Ordering::SeqCst), 1);

  // A different year count is a different key
  engine.allocator().prepare_segment_financials("AAPL", "IPhone", 3).await.unwrap();
  assert_eq!(source.segment_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn estimator_defaults_without_data() {
  let estimator = AssumptionEstimator::new(Arc::new(FixtureDataSource::new()));
  let assumptions = estimator.estimate("NONE", &AssumptionOverrides::default()).await;

  assert_eq!(assumptions.tax_rate.effective_tax_rate, 0.21);
  assert_eq!(assumptions.wacc.wacc, 0.10);
  assert_eq!(assumptions.terminal_growth.terminal_growth, 0.025);
  assert_eq!(assumptions.tax_rate.source, EstimateSource::Default);
  assert_eq!(assumptions.wacc.source, EstimateSource::Default);
  assert_eq!(assumptions.terminal_growth.source, EstimateSource::Default);
}

#[tokio::test]
async fn estimator_computes_wacc_from_balance_sheet_and_price() {
  let company: FixtureCompany = serde_json::from_value(json!({
    "income_statements": [
      {"report_period": "2024-12-31", "revenue": 1100.0, "net_income": 79.0, "income_tax_expense": 21.0, "interest_expense": 10.0},
      {"report_period": "2023-12-31", "revenue": 1050.0, "net_income": 79.0, "income_tax_expense": 21.0},
      {"report_period": "2022-12-31", "revenue": 1000.0, "net_income": 79.0, "income_tax_expense": 21.0}
    ],
    "balance_sheets": [
      {"report_period": "2024-12-28", "total_debt": 200.0, "shareholders_equity": 800.0, "outstanding_shares": 100.0}
    ],
    "price": {"ticker": "CALC", "price": 50.0}
  }))
  .unwrap();
  let estimator = AssumptionEstimator::new(Arc::new(FixtureDataSource::new().with_company("CALC", company)));

  let assumptions = estimator.estimate("CALC", &AssumptionOverrides::default()).await;

  assert_eq!(assumptions.tax_rate.source, EstimateSource::Calculated);
  assert_relative_eq(assumptions.tax_rate.effective_tax_rate, 0.21, 1e-12);

  // Market cap 100 * 50 = 5000, small-cap beta 1.3, cost of debt 10 / 200
  let cost_of_equity = 0.045 + 1.3 * 0.06;
  let expected = 5000.0 / 5200.0 * cost_of_equity + 200.0 / 5200.0 * 0.05 * (1.0 - 0.21);
  assert_eq!(assumptions.wacc.source, EstimateSource::Calculated);
  assert_relative_eq(assumptions.wacc.wacc, round4(expected), 1e-12);
  assert_relative_eq(assumptions.wacc.wacc, 0.1198, 1e-12);

  let components = assumptions.wacc.components.unwrap();
  assert_eq!(components.beta, 1.3);
  assert_relative_eq(components.cost_of_debt, 0.05, 1e-12);

  // Growth of roughly 4.9% a year is capped at 4%
  assert_eq!(assumptions.terminal_growth.source, EstimateSource::Calculated);
  assert_relative_eq(assumptions.terminal_growth.terminal_growth, 0.04, 1e-12);
}

#[tokio::test]
async fn technology_factor_value_vanishes_at_expiry() {
  let source = FixtureDataSource::new().with_company("GROW", growth_company());
  let engine = ValuationEngine::new(Arc::new(source), EngineConfig::default());
  let assumptions = GlobalAssumptions::default();

  let value = |remaining: u32| {
    IpAsset::new("P2", IpType::Patent, "Widget coating", 0.04, ValuationMethod::TechnologyFactor)
      .with_segment("Widgets", 1.0)
      .with_technology_scores(TechnologyScores { remaining_life_years: Some(remaining), ..Default::default() })
  };

  let expired = engine.value_ip_asset("GROW", &value(0), &assumptions).await.unwrap();
  let one_year = engine.value_ip_asset("GROW", &value(1), &assumptions).await.unwrap();
  let three_years = engine.value_ip_asset("GROW", &value(3), &assumptions).await.unwrap();

  assert_approx_zero(expired.total_value);
  assert!(one_year.total_value > 0.0);
  assert!(three_years.total_value > one_year.total_value);
}

#[tokio::test]
async fn structural_errors_propagate() {
  let engine = demo_engine();

  let bad_wacc = AssumptionOverrides { wacc: Some(0.02), tax_rate: Some(0.21), terminal_growth: Some(0.03) };
  let asset = IpAsset::new("P1", IpType::Patent, "Multi-touch", 0.05, ValuationMethod::ReliefFromRoyalty)
    .with_segment("IPhone", 0.2);
  let result = engine.value_ip_portfolio("AAPL", &[asset], bad_wacc).await;
  assert!(matches!(result, Err(Error::InvalidAssumption { .. })));

  let unknown: std::result::Result<IpAsset, _> = serde_json::from_value(json!({
    "id": "X1",
    "type": "patent",
    "description": "Mystery",
    "related_segments": [{"name": "IPhone", "attribution_pct": 0.1}],
    "royalty_rate": 0.05,
    "valuation_method": "black_scholes"
  }));
  let message = unknown.unwrap_err().to_string();
  assert!(message.contains("Unknown valuation method"), "{}", message);

  let no_segments = IpAsset::new("P3", IpType::Patent, "Orphan", 0.05, ValuationMethod::ExcessEarnings);
  let result = engine.value_ip_portfolio("AAPL", &[no_segments], fixed_assumptions()).await;
  assert!(matches!(result, Err(Error::InvalidAssumption { .. })));
}

#[test]
fn relief_from_royalty_matches_hand_computation() {
  let inputs = RoyaltyInputs { royalty_rate: 0.05, attribution_fraction: 1.0, tax_rate: 0.21, wacc: 0.10, terminal_growth: 0.02 };
  let result = relief_from_royalty(&[100.0, 110.0, 121.0], &inputs).unwrap();
  assert_relative_eq(result.yearly_details[0].present_value, 3.95 / 1.1, 1e-12);
}
