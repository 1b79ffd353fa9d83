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

//! Portfolio orchestration: segment profiles in, asset and portfolio valuations out.
//!
//! Segments of an asset, and assets of a portfolio, are independent; both fan out with
//! a bounded, order-preserving stream. Recoverable failures are recorded as diagnostics
//! and skipped. Structural failures abort the call.

use crate::allocator::SegmentAllocator;
use crate::assumptions::AssumptionEstimator;
use crate::cache::{InMemoryProfileCache, ProfileCache};
use crate::config::EngineConfig;
use crate::methods::{run_method, MethodInputs};
use futures::stream::{self, StreamExt};
use ipv_client::FinancialDataSource;
use ipv_core::Result;
use ipv_models::{
  AssetValuation, AssumptionOverrides, GlobalAssumptions, IpAsset, PortfolioValuation,
  SegmentAttribution, SegmentValuation, ValuationDiagnostic,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Entry point for IP asset and portfolio valuations
pub struct ValuationEngine {
  config: EngineConfig,
  allocator: SegmentAllocator,
  estimator: AssumptionEstimator,
}

impl ValuationEngine {
  /// Engine with a fresh in-memory profile cache
  pub fn new(source: Arc<dyn FinancialDataSource>, config: EngineConfig) -> Self {
    Self::with_cache(source, config, Arc::new(InMemoryProfileCache::new()))
  }

  /// Engine sharing an existing profile cache
  pub fn with_cache(
    source: Arc<dyn FinancialDataSource>,
    config: EngineConfig,
    cache: Arc<dyn ProfileCache>,
  ) -> Self {
    Self {
      allocator: SegmentAllocator::with_cache(source.clone(), cache, config.cache.clone()),
      estimator: AssumptionEstimator::new(source),
      config,
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn allocator(&self) -> &SegmentAllocator {
    &self.allocator
  }

  pub fn estimator(&self) -> &AssumptionEstimator {
    &self.estimator
  }

  /// Value one asset across its related segments.
  ///
  /// Segments that cannot be resolved are listed in `diagnostics` and left out of the
  /// total; an asset with no resolvable segment is worth zero.
  #[instrument(skip(self, asset, assumptions), fields(asset = %asset.id, method = %asset.valuation_method))]
  pub async fn value_ip_asset(
    &self,
    ticker: &str,
    asset: &IpAsset,
    assumptions: &GlobalAssumptions,
  ) -> Result<AssetValuation> {
    asset.validate()?;
    assumptions.validate()?;

    let outcomes: Vec<(&SegmentAttribution, Result<SegmentValuation>)> = stream::iter(&asset.related_segments)
      .map(move |segment| async move { (segment, self.value_segment(ticker, asset, segment, assumptions).await) })
      .buffered(self.config.max_concurrent_requests)
      .collect()
      .await;

    let mut segment_valuations = Vec::with_capacity(outcomes.len());
    let mut diagnostics = Vec::new();
    for (segment, outcome) in outcomes {
      match outcome {
        Ok(valuation) => {
          debug!("{} / {}: {:.0}", asset.id, segment.name, valuation.total_value());
          segment_valuations.push(valuation);
        }
        Err(e) if e.is_recoverable() => {
          warn!("Skipping segment {} for asset {}: {}", segment.name, asset.id, e);
          diagnostics.push(ValuationDiagnostic {
            asset_id: asset.id.clone(),
            segment: Some(segment.name.clone()),
            error: e.to_string(),
          });
        }
        Err(e) => return Err(e),
      }
    }

    let total_value: f64 = segment_valuations.iter().map(SegmentValuation::total_value).sum();
    info!(
      "Valued {} ({}) at {:.0} across {} of {} segments",
      asset.id,
      asset.valuation_method,
      total_value,
      segment_valuations.len(),
      asset.related_segments.len()
    );

    Ok(AssetValuation {
      asset_id: asset.id.clone(),
      ip_type: asset.ip_type,
      description: asset.description.clone(),
      ticker: ticker.to_uppercase(),
      method: asset.valuation_method,
      total_value,
      segment_valuations,
      diagnostics,
    })
  }

  async fn value_segment(
    &self,
    ticker: &str,
    asset: &IpAsset,
    segment: &SegmentAttribution,
    assumptions: &GlobalAssumptions,
  ) -> Result<SegmentValuation> {
    let profile =
      self.allocator.prepare_segment_financials(ticker, &segment.name, self.config.projection_years).await?;

    let revenues = profile.attributed_revenues(segment.attribution_fraction);
    let inputs = MethodInputs {
      royalty_rate: asset.royalty_rate,
      operating_margin: profile.average_operating_margin().unwrap_or(0.0),
      technology: &asset.technology,
      assumptions: *assumptions,
      config: &self.config,
    };
    let result = run_method(asset.valuation_method, &revenues, &inputs)?;

    Ok(SegmentValuation {
      segment: segment.name.clone(),
      attribution_fraction: segment.attribution_fraction,
      profile: profile.as_ref().clone(),
      result,
    })
  }

  /// Value every asset against one set of assumptions.
  ///
  /// Assumptions not supplied in `overrides` are estimated from the company's
  /// statements. Asset order is preserved; assets that fail recoverably are skipped and
  /// recorded in `diagnostics`.
  #[instrument(skip(self, assets, overrides), fields(assets = assets.len()))]
  pub async fn value_ip_portfolio(
    &self,
    ticker: &str,
    assets: &[IpAsset],
    overrides: AssumptionOverrides,
  ) -> Result<PortfolioValuation> {
    let details = self.estimator.estimate(ticker, &overrides).await;
    let assumptions = details.to_global();
    assumptions.validate()?;

    let assumptions_ref = &assumptions;
    let outcomes: Vec<(&IpAsset, Result<AssetValuation>)> = stream::iter(assets)
      .map(move |asset| async move { (asset, self.value_ip_asset(ticker, asset, assumptions_ref).await) })
      .buffered(self.config.max_concurrent_requests)
      .collect()
      .await;

    let mut asset_valuations = Vec::with_capacity(outcomes.len());
    let mut diagnostics = Vec::new();
    for (asset, outcome) in outcomes {
      match outcome {
        Ok(valuation) => {
          diagnostics.extend(valuation.diagnostics.iter().cloned());
          asset_valuations.push(valuation);
        }
        Err(e) if e.is_recoverable() => {
          warn!("Skipping asset {}: {}", asset.id, e);
          diagnostics.push(ValuationDiagnostic { asset_id: asset.id.clone(), segment: None, error: e.to_string() });
        }
        Err(e) => return Err(e),
      }
    }

    let total_portfolio_value: f64 = asset_valuations.iter().map(|a| a.total_value).sum();
    info!(
      "Portfolio {} valued at {:.0} ({} assets, {} diagnostics)",
      ticker.to_uppercase(),
      total_portfolio_value,
      asset_valuations.len(),
      diagnostics.len()
    );

    Ok(PortfolioValuation {
      ticker: ticker.to_uppercase(),
      total_portfolio_value,
      asset_count: asset_valuations.len(),
      asset_valuations,
      assumptions,
      assumption_details: (!overrides.is_complete()).then_some(details),
      diagnostics,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ipv_client::FixtureDataSource;
  use ipv_core::test_utils::assert_relative_eq;
  use ipv_core::Error;
  use ipv_models::{IpType, ValuationMethod};

  fn engine() -> ValuationEngine {
    ValuationEngine::new(Arc::new(FixtureDataSource::demo().unwrap()), EngineConfig::default())
  }

  fn iphone_patent() -> IpAsset {
    IpAsset::new("P1", IpType::Patent, "Touch input", 0.05, ValuationMethod::ReliefFromRoyalty)
      .with_segment("IPhone", 0.2)
  }

  #[tokio::test]
  async fn test_single_segment_asset_matches_direct_method() {
    let engine = engine();
    let assumptions = GlobalAssumptions::default();
    let valuation = engine.value_ip_asset("AAPL", &iphone_patent(), &assumptions).await.unwrap();

    assert_eq!(valuation.ticker, "AAPL");
    assert_eq!(valuation.segment_valuations.len(), 1);
    assert!(valuation.diagnostics.is_empty());

    let direct = crate::methods::relief_from_royalty(
      &[201183000000.0 * 0.2],
      &crate::methods::RoyaltyInputs {
        royalty_rate: 0.05,
        attribution_fraction: 1.0,
        tax_rate: 0.21,
        wacc: 0.10,
        terminal_growth: 0.02,
      },
    )
    .unwrap();
    assert_relative_eq(valuation.total_value, direct.total_value, 1e-12);
  }

  #[tokio::test]
  async fn test_missing_segment_becomes_diagnostic() {
    let asset = iphone_patent().with_segment("Automotive", 0.5);
    let valuation = engine().value_ip_asset("AAPL", &asset, &GlobalAssumptions::default()).await.unwrap();

    assert_eq!(valuation.segment_valuations.len(), 1);
    assert_eq!(valuation.diagnostics.len(), 1);
    assert_eq!(valuation.diagnostics[0].segment.as_deref(), Some("Automotive"));
    assert!(valuation.diagnostics[0].error.contains("IPhone"));
  }

  #[tokio::test]
  async fn test_invalid_assumptions_propagate() {
    let bad = GlobalAssumptions { wacc: 0.02, tax_rate: 0.21, terminal_growth: 0.03 };
    let result = engine().value_ip_asset("AAPL", &iphone_patent(), &bad).await;
    assert!(matches!(result, Err(Error::InvalidAssumption { .. })));
  }

  #[tokio::test]
  async fn test_portfolio_skips_unknown_ticker_segments() {
    let assets = vec![
      iphone_patent(),
      IpAsset::new("T1", IpType::Trademark, "Brand", 0.02, ValuationMethod::ReliefFromRoyalty)
        .with_segment("Services", 0.4),
    ];
    let overrides = AssumptionOverrides { wacc: Some(0.10), tax_rate: Some(0.21), terminal_growth: Some(0.02) };

    let portfolio = engine().value_ip_portfolio("AAPL", &assets, overrides).await.unwrap();
    assert_eq!(portfolio.asset_count, 2);
    assert_eq!(portfolio.asset_valuations[0].asset_id, "P1");
    assert_eq!(portfolio.asset_valuations[1].asset_id, "T1");
    assert!(portfolio.assumption_details.is_none());

    let sum: f64 = portfolio.asset_valuations.iter().map(|a| a.total_value).sum();
    assert_relative_eq(portfolio.total_portfolio_value, sum, 1e-15);

    let unknown = engine().value_ip_portfolio("ZZZZ", &assets, overrides).await.unwrap();
    assert_eq!(unknown.total_portfolio_value, 0.0);
    assert_eq!(unknown.asset_count, 2);
    assert_eq!(unknown.diagnostics.len(), 2);
  }
}
